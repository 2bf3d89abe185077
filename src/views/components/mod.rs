//! Reusable UI components.
//!
//! - Simple input field
//! - Modal backdrop and content builders
//! - Button and labeled-field helpers

pub mod modal_backdrop;
pub mod simple_input;
pub mod ui_helpers;

pub use modal_backdrop::{modal_backdrop, modal_content, modal_header};
pub use simple_input::{SimpleInput, SimpleInputState};
pub use ui_helpers::{button, button_primary, input_container, labeled_input};
