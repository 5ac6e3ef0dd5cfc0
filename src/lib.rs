//! Evaluation filler library
//!
//! Wires the workspace components into one run pipeline and exposes the
//! layered configuration. The `evalfill` binary is a thin CLI over this.

pub mod config;
pub mod errors;
pub mod runner;

pub use config::{AppConfig, PortalConfig};
pub use errors::AppError;
pub use runner::Pipeline;
