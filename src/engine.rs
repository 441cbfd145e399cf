//! The reset engine core: due-date evaluation, per-task state
//! transitions, and change aggregation for one run.
//!
//! A run is strictly sequential: tasks are evaluated and reset one at a
//! time in query order, and every failure is contained here. A store
//! query failure aborts the run with no mutations; a bad record or a
//! rejected update only costs that one task. [`ResetEngine::run_once`]
//! never returns an error — the outcome lands in the [`RunReport`] and
//! the log.

use chrono::{Duration, NaiveDate};
use tracing::{debug, error, info};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::notify::{Dispatcher, format_change_report};
use crate::record::{ChangeRecord, TaskPage, TaskStatus};
use crate::store::TaskStore;

/// Decide whether a completed task is due for reset.
///
/// Due iff the status is still `Done` and the next-due date is on or
/// before `yesterday` (inclusive). The one-day offset keeps a task due
/// *today* untouched until the following run; only tasks already overdue
/// as of the previous day are reset.
///
/// Missing status or due-date fields are reported as invalid-record
/// errors with the field name; callers decide whether to log and
/// continue.
pub fn evaluate(
    page: &TaskPage,
    status_property: &str,
    due_property: &str,
    yesterday: NaiveDate,
) -> Result<bool> {
    if page.status(status_property)? != TaskStatus::Done {
        return Ok(false);
    }
    let due_next = page.due_next(due_property)?;
    Ok(due_next <= yesterday)
}

/// Counters and change set summarizing one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Tasks returned by the store query.
    pub candidates: usize,
    /// Tasks evaluated as not yet due (includes non-Done strays).
    pub not_due: usize,
    /// Records skipped for missing or malformed fields.
    pub invalid: usize,
    /// Reset attempts rejected by the store.
    pub transition_failed: usize,
    /// Recipients the notification was delivered to.
    pub notified: usize,
    /// Whether the initial query failed (run aborted, nothing mutated).
    pub query_failed: bool,
    /// Successful resets, in processing order.
    pub changes: Vec<ChangeRecord>,
}

impl RunReport {
    /// One-line log summary.
    pub fn summary(&self) -> String {
        if self.query_failed {
            return "query failed, no tasks processed".to_owned();
        }
        format!(
            "{} candidates, {} reset, {} not due, {} invalid, {} failed, {} notified",
            self.candidates,
            self.changes.len(),
            self.not_due,
            self.invalid,
            self.transition_failed,
            self.notified
        )
    }
}

/// Orchestrates one full reset pass: query, evaluate, transition,
/// aggregate, notify.
pub struct ResetEngine<S> {
    store: S,
    dispatcher: Option<Box<dyn Dispatcher>>,
    recipients: Vec<String>,
    status_property: String,
    due_property: String,
}

impl<S: TaskStore> ResetEngine<S> {
    /// Build an engine over a store. Property names come from the store
    /// configuration; no dispatcher is attached by default.
    pub fn new(store: S, config: &StoreConfig) -> Self {
        Self {
            store,
            dispatcher: None,
            recipients: Vec::new(),
            status_property: config.status_property.clone(),
            due_property: config.due_property.clone(),
        }
    }

    /// Attach a notification dispatcher and its recipient list.
    pub fn with_dispatcher(
        mut self,
        dispatcher: Box<dyn Dispatcher>,
        recipients: Vec<String>,
    ) -> Self {
        self.dispatcher = Some(dispatcher);
        self.recipients = recipients;
        self
    }

    /// Execute one full pass for the given reference date.
    ///
    /// Always completes: failures are logged and reflected in the
    /// returned report, never propagated.
    pub async fn run_once(&self, today: NaiveDate) -> RunReport {
        let yesterday = today - Duration::days(1);
        info!("run started (today {today}, due cutoff {yesterday})");

        let mut report = RunReport::default();

        let pages = match self.store.query_done().await {
            Ok(pages) => pages,
            Err(e) => {
                error!("store query failed, aborting run: {e}");
                report.query_failed = true;
                info!("run finished: {}", report.summary());
                return report;
            }
        };
        report.candidates = pages.len();

        for page in &pages {
            self.process_page(page, today, yesterday, &mut report).await;
        }

        self.dispatch(&mut report).await;
        info!("run finished: {}", report.summary());
        report
    }

    async fn process_page(
        &self,
        page: &TaskPage,
        today: NaiveDate,
        yesterday: NaiveDate,
        report: &mut RunReport,
    ) {
        match evaluate(page, &self.status_property, &self.due_property, yesterday) {
            Ok(false) => report.not_due += 1,
            Err(e) => {
                error!("skipping record: {e}");
                report.invalid += 1;
            }
            Ok(true) => {
                // A task without a locatable title is invalid input too;
                // resolve it before mutating anything.
                let title = match page.title() {
                    Ok(title) => title,
                    Err(e) => {
                        error!("skipping record: {e}");
                        report.invalid += 1;
                        return;
                    }
                };

                info!("resetting '{title}' (page {})", page.id);
                match self.store.apply_reset(&page.id, today).await {
                    Ok(()) => report.changes.push(ChangeRecord {
                        page_id: page.id.clone(),
                        title,
                    }),
                    Err(e) => {
                        // stays Done and overdue, retried next run
                        error!("{e}");
                        report.transition_failed += 1;
                    }
                }
            }
        }
    }

    async fn dispatch(&self, report: &mut RunReport) {
        if report.changes.is_empty() {
            return;
        }
        let Some(dispatcher) = &self.dispatcher else {
            debug!("no dispatcher configured, skipping notification");
            return;
        };

        let body = format_change_report(&report.changes);
        for recipient in &self.recipients {
            match dispatcher.send(recipient, &body).await {
                Ok(()) => {
                    info!("sent update notification to {recipient}");
                    report.notified += 1;
                }
                Err(e) => error!("notification to {recipient} failed: {e}"),
            }
        }
    }
}
