//! Flow orchestration layer
//!
//! The [`Navigator`] moves the session between the list view and an item's
//! detail view; the [`BatchOrchestrator`] is the bounded control loop that
//! re-extracts the queue every iteration, processes only its head item and
//! isolates per-item failures behind a best-effort recovery.

pub mod errors;
pub mod navigator;
pub mod orchestrator;
pub mod strategies;
pub mod types;

pub use errors::{FlowError, NavigationError, NavigationStage};
pub use navigator::{Navigation, Navigator, NavigatorConfig};
pub use orchestrator::BatchOrchestrator;
pub use strategies::{DefaultRecoveryHandler, RecoveryHandler};
pub use types::{BatchConfig, BatchReport, BatchResult, BatchStatus, RecoveryOutcome};
