//! Modal backdrop component for overlay dialogs.

use crate::theme::ThemeColors;
use gpui::*;

/// Create a modal backdrop with click-to-close functionality.
///
/// Returns a positioned div that covers the screen with a semi-transparent
/// overlay. Attach an `on_mouse_down` listener to close the modal.
pub fn modal_backdrop(id: impl Into<SharedString>, _t: &ThemeColors) -> Stateful<Div> {
    div()
        .id(ElementId::Name(id.into()))
        .occlude()
        .absolute()
        .inset_0()
        .bg(hsla(0.0, 0.0, 0.0, 0.5))
        .flex()
        .justify_center()
}

/// Create a modal content container with standard styling.
///
/// Includes a mouse handler that prevents clicks from propagating to the
/// backdrop.
pub fn modal_content(id: impl Into<SharedString>, t: &ThemeColors) -> Stateful<Div> {
    div()
        .id(ElementId::Name(id.into()))
        .bg(rgb(t.bg_primary))
        .rounded(px(8.0))
        .border_1()
        .border_color(rgb(t.border))
        .shadow_xl()
        .flex()
        .flex_col()
        .on_mouse_down(MouseButton::Left, |_, _, cx| {
            cx.stop_propagation();
        })
        .on_scroll_wheel(|_, _, cx| {
            cx.stop_propagation();
        })
}

/// Create a modal header with title, optional subtitle, and close button.
pub fn modal_header<F>(
    title: impl Into<SharedString>,
    subtitle: Option<impl Into<SharedString>>,
    t: &ThemeColors,
    on_close: F,
) -> Stateful<Div>
where
    F: Fn(&MouseDownEvent, &mut Window, &mut App) + 'static,
{
    let title = title.into();
    let subtitle = subtitle.map(|s| s.into());

    let mut title_section = div().flex().flex_col().gap(px(2.0)).child(
        div()
            .text_size(px(16.0))
            .font_weight(FontWeight::SEMIBOLD)
            .text_color(rgb(t.text_primary))
            .child(title),
    );

    if let Some(subtitle) = subtitle {
        title_section = title_section.child(
            div()
                .text_size(px(11.0))
                .text_color(rgb(t.text_muted))
                .child(subtitle),
        );
    }

    div()
        .id("modal-header")
        .px(px(16.0))
        .py(px(12.0))
        .flex()
        .items_center()
        .justify_between()
        .border_b_1()
        .border_color(rgb(t.border))
        .child(title_section)
        .child(
            div()
                .id("modal-close-btn")
                .cursor_pointer()
                .w(px(28.0))
                .h(px(28.0))
                .flex()
                .items_center()
                .justify_center()
                .rounded(px(4.0))
                .hover(|s| s.bg(rgb(t.bg_hover)))
                .text_size(px(16.0))
                .text_color(rgb(t.text_secondary))
                .child("✕")
                .on_mouse_down(MouseButton::Left, on_close),
        )
}
