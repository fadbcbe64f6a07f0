// src/pipeline/tick.rs

//! One fetch → extract → evaluate → notify cycle.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{
    Config, ConditionEntry, ConditionTable, MatchResult, MessagesConfig, Post,
};
use crate::services::{Condition, HttpFetcher, Notifier, PageFetcher, PostExtractor};

use super::state::WatchState;

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// A condition matched and a notification was sent
    Matched(MatchResult),
    /// The page was read but nothing matched
    NoMatch { post_count: usize },
    /// Fetching or decoding failed; displayed posts were kept
    Failed(AppError),
    /// Another tick was still in flight
    Skipped,
}

/// Find the first matching pair: posts in extraction order, conditions in
/// table order. Scanning stops at the first hit.
pub fn find_first_match(table: &ConditionTable, posts: &[Post]) -> Option<MatchResult> {
    let compiled = compile_conditions(table);
    posts.iter().find_map(|post| {
        compiled
            .iter()
            .find(|(_, condition)| condition.evaluate(post))
            .map(|(entry, _)| MatchResult {
                condition: entry.condition.clone(),
                tag: entry.tag.clone(),
                post: post.clone(),
            })
    })
}

/// Parse every condition once, in table order. Malformed conditions are
/// logged and left out.
fn compile_conditions(table: &ConditionTable) -> Vec<(&ConditionEntry, Condition)> {
    table
        .iter()
        .filter_map(|entry| match Condition::parse(&entry.condition) {
            Ok(condition) => Some((entry, condition)),
            Err(e) => {
                log::warn!("Skipping condition '{}': {}", entry.condition, e);
                None
            }
        })
        .collect()
}

/// Drives a single tick against the shared [`WatchState`].
pub struct MatchPipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: PostExtractor,
    notifier: Arc<dyn Notifier>,
    messages: MessagesConfig,
    state: Arc<WatchState>,
}

impl MatchPipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: PostExtractor,
        notifier: Arc<dyn Notifier>,
        messages: MessagesConfig,
        state: Arc<WatchState>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            notifier,
            messages,
            state,
        }
    }

    /// Build a pipeline that fetches over HTTP as configured.
    pub fn from_config(
        config: &Config,
        notifier: Arc<dyn Notifier>,
        state: Arc<WatchState>,
    ) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HttpFetcher::from_config(&config.watcher)?),
            PostExtractor::new(&config.extraction)?,
            notifier,
            config.messages.clone(),
            state,
        ))
    }

    pub fn state(&self) -> &Arc<WatchState> {
        &self.state
    }

    /// Run one cycle. Never fails; errors end the cycle early and are
    /// reported through the outcome and the feedback message.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = self.state.begin_tick() else {
            log::debug!("Previous check still in flight; skipping tick");
            return TickOutcome::Skipped;
        };

        let outcome = match self.run_cycle().await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Check failed: {}", e);
                self.state
                    .set_feedback(self.messages.fetch_failed_feedback.as_str());
                TickOutcome::Failed(e)
            }
        };
        self.state.mark_checked();
        outcome
    }

    async fn run_cycle(&self) -> Result<TickOutcome> {
        let html = self.fetcher.fetch_page().await?;
        let posts = self.extractor.extract(&html);
        let table = self.state.conditions();

        let outcome = match find_first_match(&table, &posts) {
            Some(found) => {
                log::info!(
                    "Condition '{}' [{}] matched: {}",
                    found.condition,
                    found.tag,
                    found.post.title
                );
                self.send_notification(&found).await;
                self.state
                    .set_feedback(found.format(&self.messages.match_feedback));
                TickOutcome::Matched(found)
            }
            None => {
                log::debug!(
                    "No match among {} post(s) and {} condition(s)",
                    posts.len(),
                    table.len()
                );
                self.state
                    .set_feedback(self.messages.no_match_feedback.as_str());
                TickOutcome::NoMatch {
                    post_count: posts.len(),
                }
            }
        };

        self.state.replace_posts(posts);
        Ok(outcome)
    }

    async fn send_notification(&self, found: &MatchResult) {
        let title = found.format(&self.messages.notification_title);
        let body = found.format(&self.messages.notification_body);
        if let Err(e) = self.notifier.notify(&title, &body).await {
            log::warn!("Failed to deliver notification: {}", e);
        }
    }
}
