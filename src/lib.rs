//! Recurring-task reset engine.
//!
//! Scans a task database for completed items whose next-due date has
//! passed, resets them to an actionable state, stamps the completion
//! date, and sends one SMS summary of everything that changed. The
//! next-due date itself is computed upstream by a formula property; this
//! crate only decides when a completed task crosses the overdue line and
//! performs the reset.
//!
//! The core ([`engine`]) is sequential orchestration over two seams —
//! [`store::TaskStore`] and [`notify::Dispatcher`] — so the run logic is
//! exercised identically against the production REST adapters and test
//! doubles. One process invocation is one run; an external scheduler
//! owns the cadence.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notify;
pub mod record;
pub mod store;

pub use config::EngineConfig;
pub use engine::{ResetEngine, RunReport, evaluate};
pub use error::{EngineError, Result};
pub use record::{ChangeRecord, TaskPage, TaskStatus};
