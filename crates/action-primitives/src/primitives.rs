//! Action primitives implementation
//!
//! Core primitives shared by every component that touches the page:
//! 1. activate - click with a synthetic fallback for occluded elements
//! 2. force_enable - strip a disabling attribute before activation
//! 3. fill_text - clear and type into a text control
//! 4. satisfies / wait_for_url - condition checks used by locators and detectors
//! 5. navigate_and_settle / go_back_and_settle - history moves with a settle delay

mod click;
mod navigate;
mod type_text;
mod wait;

pub use click::*;
pub use navigate::*;
pub use type_text::*;
pub use wait::*;
