//! Work item extractor
//!
//! Parses the pending-work table of the list view into [`WorkItem`] records.
//! "Nothing left to do" is an empty result, never an error: the completion
//! banner is checked before the table is even looked up, and a table without
//! data rows is treated the same way. Only an unreachable table with no
//! banner fails the pass.

pub mod config;
pub mod errors;
pub mod extractor;
pub mod models;

pub use config::{CellDefaults, ExtractorConfig};
pub use errors::ExtractionError;
pub use extractor::{WorkItemExtractor, WorkQueue};
pub use models::{ActionHandle, WorkItem};
