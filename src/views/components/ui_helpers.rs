//! Shared UI helper functions for buttons and labeled form fields.

use crate::theme::ThemeColors;
use gpui::*;

/// Standard secondary button.
pub fn button(id: impl Into<SharedString>, label: &str, t: &ThemeColors) -> Stateful<Div> {
    div()
        .id(ElementId::Name(id.into()))
        .cursor_pointer()
        .px(px(12.0))
        .py(px(5.0))
        .rounded(px(4.0))
        .bg(rgb(t.bg_secondary))
        .hover(|s| s.bg(rgb(t.bg_hover)))
        .text_size(px(12.0))
        .text_color(rgb(t.text_primary))
        .child(label.to_string())
}

/// Primary call-to-action button.
pub fn button_primary(id: impl Into<SharedString>, label: &str, t: &ThemeColors) -> Stateful<Div> {
    div()
        .id(ElementId::Name(id.into()))
        .cursor_pointer()
        .px(px(14.0))
        .py(px(5.0))
        .rounded(px(4.0))
        .bg(rgb(t.button_primary_bg))
        .hover(|s| s.bg(rgb(t.button_primary_hover)))
        .text_size(px(12.0))
        .text_color(rgb(t.button_primary_fg))
        .child(label.to_string())
}

/// Column with a small label above a form control.
pub fn labeled_input(label: &str, t: &ThemeColors) -> Div {
    div().flex().flex_col().gap(px(4.0)).child(
        div()
            .text_size(px(10.0))
            .text_color(rgb(t.text_secondary))
            .child(label.to_string()),
    )
}

/// Bordered container wrapping a `SimpleInput`.
pub fn input_container(t: &ThemeColors) -> Div {
    div()
        .w_full()
        .rounded(px(4.0))
        .border_1()
        .border_color(rgb(t.border))
        .bg(rgb(t.bg_primary))
}
