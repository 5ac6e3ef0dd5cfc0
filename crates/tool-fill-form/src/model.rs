use serde::{Deserialize, Serialize};
use std::fmt;

use action_primitives::ActivationMethod;

/// Mandatory steps of a form submission
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    FormRoot,
    Comment,
    Submit,
}

impl fmt::Display for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormStep::FormRoot => "form root",
            FormStep::Comment => "free-text field",
            FormStep::Submit => "submit control",
        })
    }
}

/// Outcome of one successful fill-and-submit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    /// Question groups found in the form
    pub questions: usize,
    /// Groups whose chosen answer was activated
    pub answered: usize,
    /// Submit control had to be force-enabled
    pub submit_forced: bool,
    /// How the submit control was activated
    pub activation: ActivationMethod,
    /// Post-submit return to the list was observed
    pub confirmed: bool,
}

impl FillReport {
    pub fn is_complete(&self) -> bool {
        self.answered == self.questions
    }
}
