//! Locator resolver - ordered multi-candidate element resolution
//!
//! Every component that has to find something on the page goes through this
//! crate. A lookup is described by a [`CandidateSet`]: structural queries
//! authored most-specific-first. The resolver walks them strictly in order and
//! the first candidate that satisfies the requested presence condition within
//! the timeout wins. There is no scoring and no merging of matches.

pub mod errors;
pub mod resolver;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use types::*;
