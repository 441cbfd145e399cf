//! Task store adapters.
//!
//! The engine core talks to the store through [`TaskStore`], so the run
//! logic can be exercised against test doubles as well as the production
//! REST adapter.

pub mod notion;

pub use notion::{NotionStore, database_id_from_url};

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::error::Result;
use crate::record::TaskPage;

/// Task store contract: query completed tasks and apply resets.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch every task currently marked Done.
    async fn query_done(&self) -> Result<Vec<TaskPage>>;

    /// Reset one task: status back to Not Started and the completion
    /// date stamped, applied by a single update call so the store never
    /// exposes a half-updated record.
    async fn apply_reset(&self, page_id: &str, today: NaiveDate) -> Result<()>;
}

#[async_trait]
impl<S: TaskStore + ?Sized> TaskStore for Arc<S> {
    async fn query_done(&self) -> Result<Vec<TaskPage>> {
        (**self).query_done().await
    }

    async fn apply_reset(&self, page_id: &str, today: NaiveDate) -> Result<()> {
        (**self).apply_reset(page_id, today).await
    }
}
