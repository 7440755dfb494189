//! Crawler module for list and detail page processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with header shaping
//! - Block signal detection
//! - List page parsing
//! - The URL frontier and worker scheduling policy
//! - Overall crawl coordination

mod block;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use block::{BlockDetector, NoBlockDetection, PhraseBlockDetector};
pub use coordinator::{run_crawl, seed_tasks, Coordinator};
pub use fetcher::{build_http_client, FetchedPage, HttpFetcher, PageFetcher, RequestProfile};
pub use frontier::{Frontier, FrontierTask, TaskKind};
pub use parser::{page_text, parse_list_page, ListPage};
pub use scheduler::{retry_backoff, ConcurrencyGovernor};
