//! Notification delivery.
//!
//! The engine core sends the batch summary through [`Dispatcher`]; the
//! production implementation is the SMS adapter in [`sms`].

pub mod sms;

pub use sms::SmsDispatcher;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::record::ChangeRecord;

/// Notification channel contract.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Deliver one message body to one recipient.
    async fn send(&self, recipient: &str, body: &str) -> Result<()>;
}

#[async_trait]
impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    async fn send(&self, recipient: &str, body: &str) -> Result<()> {
        (**self).send(recipient, body).await
    }
}

/// Render the batch notification body: a header line, then one
/// `Page ID` / `Title` block per reset task, blocks separated by blank
/// lines, in processing order.
pub fn format_change_report(changes: &[ChangeRecord]) -> String {
    use std::fmt::Write;

    let mut body = String::from("Updated pages:\n\n");
    for change in changes {
        let _ = writeln!(body, "Page ID: {}\nTitle: {}\n", change.page_id, change.title);
    }
    body
}
