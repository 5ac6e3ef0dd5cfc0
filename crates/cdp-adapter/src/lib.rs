//! Chrome DevTools Protocol session adapter
//!
//! Implements the session traits of `action-primitives` on top of
//! chromiumoxide. A session is either attached to a running browser or
//! launched against a persistent user profile, so a manual portal login
//! survives between runs.
//!
//! Element handles do not hold protocol object ids. Matched nodes are
//! stamped with a reference attribute and looked up again for every
//! operation; once the node leaves the document the handle reports
//! [`action_primitives::ActionError::StaleElement`].

pub mod config;
pub mod error;
mod scripts;
pub mod session;

pub use config::{BrowserSettings, CHROME_ENV};
pub use error::{AdapterError, AdapterErrorKind};
pub use session::{CdpElement, CdpSession};
