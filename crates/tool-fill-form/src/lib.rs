//! Form filler
//!
//! Fills one detail form: every question group gets the choice picked by the
//! configured [`AnswerPolicy`], the free-text field gets a fixed value, and
//! the submit control is force-enabled and activated. A question that cannot
//! be answered is logged and skipped; the post-submit confirmation is
//! best-effort and never fails the submission.

pub mod answer;
pub mod api;
pub mod errors;
pub mod model;
pub mod policy;

mod runner;

pub use answer::{AnswerPolicy, PerKindPolicy, PreferredChoicePolicy};
pub use api::{FormFiller, FormFillerBuilder, FormSubmitter};
pub use errors::FormError;
pub use model::{FillReport, FormStep};
pub use policy::{AnswerPolicyConfig, FormConfig, FormTimeouts, ReturnSignals};
