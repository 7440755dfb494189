//! URL frontier
//!
//! FIFO queue of pending list and detail tasks. Dedup and the detail
//! ceiling are delegated to [`RunState`], so the frontier itself only keeps
//! order. The coordinator is its single writer.

use crate::state::{Admission, DedupKey, RunState};
use crate::url::extract_job_id;
use std::collections::VecDeque;
use std::sync::Arc;
use url::Url;

/// What a task fetches and how its page is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// A search-result page
    List {
        /// 1-based page number within the scope
        page: u32,

        /// Keyword for canonical search pagination; `None` when the page
        /// came from an explicit seed that is not a search URL
        keyword: Option<String>,

        /// Site root used to build the next search URL
        search_base: String,
    },

    /// A posting page
    Detail { job_id: Option<String> },
}

/// One unit of work
#[derive(Debug, Clone)]
pub struct FrontierTask {
    pub kind: TaskKind,
    pub url: Url,
    pub dedup_key: DedupKey,

    /// Retries already spent on this task
    pub attempt: u32,
}

impl FrontierTask {
    /// Creates the first list task of a scope
    ///
    /// The dedup scope is the keyword when there is one, the URL otherwise.
    pub fn list(url: Url, page: u32, keyword: Option<String>, search_base: String) -> Self {
        let scope = keyword.clone().unwrap_or_else(|| url.to_string());
        Self::list_in_scope(url, page, keyword, search_base, scope)
    }

    /// Creates a list task that continues an existing scope
    pub fn list_in_scope(
        url: Url,
        page: u32,
        keyword: Option<String>,
        search_base: String,
        scope: String,
    ) -> Self {
        Self {
            dedup_key: DedupKey::ListPage { scope, page },
            kind: TaskKind::List {
                page,
                keyword,
                search_base,
            },
            url,
            attempt: 0,
        }
    }

    /// Creates a detail task keyed by the posting identifier in its URL
    pub fn detail(url: Url) -> Self {
        let job_id = extract_job_id(url.as_str());
        let key = job_id.clone().unwrap_or_else(|| url.to_string());
        Self {
            kind: TaskKind::Detail { job_id },
            dedup_key: DedupKey::Detail(key),
            url,
            attempt: 0,
        }
    }

    /// Dedup scope of a list task
    pub fn list_scope(&self) -> Option<&str> {
        match &self.dedup_key {
            DedupKey::ListPage { scope, .. } => Some(scope),
            DedupKey::Detail(_) => None,
        }
    }

    pub fn is_detail(&self) -> bool {
        matches!(self.kind, TaskKind::Detail { .. })
    }

    /// Short label for log lines
    pub fn label(&self) -> String {
        match &self.kind {
            TaskKind::List { page, .. } => format!("LIST #{}", page),
            TaskKind::Detail { job_id } => {
                format!("DETAIL {}", job_id.as_deref().unwrap_or(self.url.as_str()))
            }
        }
    }
}

/// Pending tasks in discovery order
pub struct Frontier {
    queue: VecDeque<FrontierTask>,
    state: Arc<RunState>,
}

impl Frontier {
    pub fn new(state: Arc<RunState>) -> Self {
        Self {
            queue: VecDeque::new(),
            state,
        }
    }

    /// Enqueues a list task unless its key was already seen
    ///
    /// # Returns
    ///
    /// * `true` - The task was appended
    /// * `false` - Duplicate; nothing changed
    pub fn enqueue_list(&mut self, task: FrontierTask) -> bool {
        if !self.state.admit(task.dedup_key.clone()) {
            tracing::debug!("Skipping duplicate {}", task.label());
            return false;
        }

        self.queue.push_back(task);
        true
    }

    /// Enqueues a detail task subject to dedup and the detail ceiling
    pub fn enqueue_detail(&mut self, task: FrontierTask) -> Admission {
        let admission = self.state.admit_detail(task.dedup_key.clone());
        if admission == Admission::Accepted {
            self.queue.push_back(task);
        }
        admission
    }

    /// Puts a failed task back for another attempt
    ///
    /// Its key is already marked seen, so dedup is bypassed.
    pub fn requeue(&mut self, mut task: FrontierTask) {
        task.attempt += 1;
        self.queue.push_back(task);
    }

    pub fn dequeue(&mut self) -> Option<FrontierTask> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
