//! Page state detector
//!
//! The portal offers no event stream, so application state is re-derived by
//! inspection every time it is needed. Each question is answered with the
//! same tiered pattern: ordered strong signals, then ordered weak signals,
//! then a diagnostic `Unknown` that leaves the decision to the caller.

pub mod config;
pub mod detector;
pub mod errors;
pub mod models;

pub use config::{DetectorConfig, ViewSignals};
pub use detector::{PageStateDetector, StateDetector};
pub use errors::DetectorError;
pub use models::{ArrivalSignal, PageDiagnostics, PageState, View};
