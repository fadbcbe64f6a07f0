// src/pipeline/state.rs

//! Shared watcher state.
//!
//! Every value is replaced wholesale; readers get an `Arc` snapshot and never
//! observe a partially updated value.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};
use parking_lot::RwLock;

use crate::models::{ConditionTable, Post};

/// State shared by the pipeline, the scheduler and the controls.
#[derive(Debug, Default)]
pub struct WatchState {
    conditions: RwLock<Arc<ConditionTable>>,
    posts: RwLock<Arc<Vec<Post>>>,
    feedback: RwLock<Arc<str>>,
    last_checked: RwLock<Option<DateTime<Local>>>,
    checking: AtomicBool,
    loading: AtomicBool,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently installed condition table.
    pub fn conditions(&self) -> Arc<ConditionTable> {
        Arc::clone(&self.conditions.read())
    }

    /// Install a new table, replacing the previous one entirely.
    pub fn install_conditions(&self, table: ConditionTable) {
        *self.conditions.write() = Arc::new(table);
    }

    /// Posts extracted by the last successful tick.
    pub fn posts(&self) -> Arc<Vec<Post>> {
        Arc::clone(&self.posts.read())
    }

    pub fn replace_posts(&self, posts: Vec<Post>) {
        *self.posts.write() = Arc::new(posts);
    }

    pub fn feedback(&self) -> Arc<str> {
        Arc::clone(&self.feedback.read())
    }

    pub fn set_feedback(&self, feedback: impl Into<Arc<str>>) {
        *self.feedback.write() = feedback.into();
    }

    pub fn last_checked(&self) -> Option<DateTime<Local>> {
        *self.last_checked.read()
    }

    pub(crate) fn mark_checked(&self) {
        *self.last_checked.write() = Some(Local::now());
    }

    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::Acquire)
    }

    /// Set the checking flag, returning the previous value.
    pub(crate) fn set_checking(&self, checking: bool) -> bool {
        self.checking.swap(checking, Ordering::AcqRel)
    }

    /// Whether a tick is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Claim the single in-flight slot. `None` while another tick holds it.
    pub(crate) fn begin_tick(&self) -> Option<TickGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickGuard { state: self })
    }
}

/// Releases the in-flight slot (the loading flag) when dropped.
pub(crate) struct TickGuard<'a> {
    state: &'a WatchState,
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.state.loading.store(false, Ordering::Release);
    }
}
