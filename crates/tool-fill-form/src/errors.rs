use thiserror::Error;

use crate::model::FormStep;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A mandatory step of the fill-and-submit sequence failed
    #[error("form submission failed at {step}: {reason}")]
    SubmissionFailed { step: FormStep, reason: String },

    #[error("form filler misconfigured: {0}")]
    Misconfigured(String),
}

impl FormError {
    pub(crate) fn at(step: FormStep, reason: impl ToString) -> Self {
        FormError::SubmissionFailed {
            step,
            reason: reason.to_string(),
        }
    }

    /// Step that failed, if any
    pub fn step(&self) -> Option<FormStep> {
        match self {
            FormError::SubmissionFailed { step, .. } => Some(*step),
            FormError::Misconfigured(_) => None,
        }
    }
}
