//! Service layer for the watcher.
//!
//! This module contains the business logic for:
//! - Page retrieval and decoding (`PageFetcher`, `HttpFetcher`)
//! - Post extraction (`PostExtractor`)
//! - Condition evaluation (`evaluator`)
//! - Condition spreadsheet loading (`ConditionLoader`)
//! - Notification delivery (`Notifier`)

pub mod evaluator;
mod extractor;
mod fetcher;
mod loader;
mod notifier;

pub use evaluator::{Condition, evaluate, matches};
pub use extractor::PostExtractor;
pub use fetcher::{HttpFetcher, PageFetcher, decode_page};
pub use loader::{CONDITION_FILE_EXTENSION, ConditionLoader};
pub use notifier::{GatedNotifier, LogNotifier, Notifier, WebhookNotifier, build_notifier};
