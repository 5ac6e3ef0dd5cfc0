//! Action primitives - the session boundary and low-level DOM operations
//!
//! This crate provides the building blocks every higher layer works through:
//! - Session traits over a live browser page and its elements
//! - Structural queries (CSS, XPath, tag + text) and presence conditions
//! - Primitives: navigate, activate, fill text, wait for URL
//! - Bounded polling with a fixed cadence
//!
//! The `testing` feature exposes an in-memory DOM implementing the session
//! traits so downstream crates can exercise their logic without a browser.

pub mod errors;
mod primitives;
pub mod session;
pub mod types;
mod waiting;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::*;
pub use primitives::*;
pub use session::*;
pub use types::*;
pub use waiting::*;
