//! Type text primitive - Replace the content of a text control

use crate::{errors::ActionError, session::Element};
use tracing::debug;

/// Clear the control, then type `value` into it.
pub async fn fill_text(element: &Element, value: &str) -> Result<(), ActionError> {
    debug!(target = %element.describe(), chars = value.chars().count(), "Filling text control");
    element.clear().await?;
    element.set_text(value).await
}
