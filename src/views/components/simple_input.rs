use crate::theme::theme;
use gpui::prelude::*;
use gpui::*;

use std::ops::Range;
use std::time::Duration;

/// Event emitted when input value changes
pub struct InputChangedEvent;

/// Event emitted when Enter is pressed inside the input
pub struct InputSubmitEvent;

/// Result of key handling
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum KeyHandled {
    /// Key was handled, stop propagation
    Handled,
    /// Key was not handled, let parent handle (e.g., Escape with no selection)
    NotHandled,
    /// Key was ignored (modifier-only, function keys), don't stop propagation
    Ignored,
}

/// A single-line text input state with its own cursor, selection, and
/// clipboard handling.
pub struct SimpleInputState {
    focus_handle: FocusHandle,
    value: String,
    placeholder: String,
    cursor_position: usize,
    selection: Option<Range<usize>>,
    cursor_visible: bool,
    masked: bool,
    _blink_task: Option<Task<()>>,
    /// TextLayout of the rendered line for click-to-cursor mapping.
    text_layout: Option<TextLayout>,
    /// Whether the user is currently dragging to select text.
    is_selecting: bool,
    /// Anchor position (char offset) for drag selection.
    select_anchor: usize,
}

impl SimpleInputState {
    pub fn new(cx: &mut Context<Self>) -> Self {
        let focus_handle = cx.focus_handle();

        // Start cursor blink task
        let blink_task = cx.spawn(async move |this: WeakEntity<SimpleInputState>, cx| {
            loop {
                smol::Timer::after(Duration::from_millis(530)).await;
                let result = cx.update(|cx| {
                    this.update(cx, |state, cx| {
                        state.cursor_visible = !state.cursor_visible;
                        cx.notify();
                    })
                });
                if result.is_err() {
                    break;
                }
            }
        });

        Self {
            focus_handle,
            value: String::new(),
            placeholder: String::new(),
            cursor_position: 0,
            selection: None,
            cursor_visible: true,
            masked: false,
            _blink_task: Some(blink_task),
            text_layout: None,
            is_selecting: false,
            select_anchor: 0,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Render the value as bullets (token fields).
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        let v = value.into();
        self.cursor_position = v.chars().count();
        self.value = v;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>, cx: &mut Context<Self>) {
        let v = value.into();
        let changed = v != self.value;
        self.cursor_position = v.chars().count();
        self.value = v;
        self.selection = None;
        if changed {
            cx.emit(InputChangedEvent);
        }
        cx.notify();
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        window.focus(&self.focus_handle, cx);
    }

    fn reset_cursor_blink(&mut self) {
        self.cursor_visible = true;
    }

    fn insert_text(&mut self, text: &str, cx: &mut Context<Self>) {
        if let Some(range) = self.selection.take() {
            self.value
                .replace_range(self.byte_range_for_chars(&range), "");
            self.cursor_position = range.start;
        }

        let byte_pos = self.byte_position_for_char(self.cursor_position);
        self.value.insert_str(byte_pos, text);
        self.cursor_position += text.chars().count();
        self.reset_cursor_blink();
        cx.emit(InputChangedEvent);
        cx.notify();
    }

    fn delete_backward(&mut self, cx: &mut Context<Self>) {
        let had_content = !self.value.is_empty() || self.selection.is_some();
        if let Some(range) = self.selection.take() {
            self.value
                .replace_range(self.byte_range_for_chars(&range), "");
            self.cursor_position = range.start;
        } else if self.cursor_position > 0 {
            let prev_pos = self.cursor_position - 1;
            let byte_range = self.byte_range_for_chars(&(prev_pos..self.cursor_position));
            self.value.replace_range(byte_range, "");
            self.cursor_position = prev_pos;
        }
        self.reset_cursor_blink();
        if had_content {
            cx.emit(InputChangedEvent);
        }
        cx.notify();
    }

    fn delete_forward(&mut self, cx: &mut Context<Self>) {
        let had_content = !self.value.is_empty() || self.selection.is_some();
        if let Some(range) = self.selection.take() {
            self.value
                .replace_range(self.byte_range_for_chars(&range), "");
            self.cursor_position = range.start;
        } else {
            let char_count = self.value.chars().count();
            if self.cursor_position < char_count {
                let next_pos = self.cursor_position + 1;
                let byte_range = self.byte_range_for_chars(&(self.cursor_position..next_pos));
                self.value.replace_range(byte_range, "");
            }
        }
        self.reset_cursor_blink();
        if had_content {
            cx.emit(InputChangedEvent);
        }
        cx.notify();
    }

    fn move_cursor_left(&mut self, extend_selection: bool, cx: &mut Context<Self>) {
        if self.cursor_position > 0 {
            let old_pos = self.cursor_position;
            self.cursor_position -= 1;

            if extend_selection {
                self.extend_selection(old_pos, self.cursor_position);
            } else if let Some(sel) = self.selection.take() {
                self.cursor_position = sel.start;
            }
            self.reset_cursor_blink();
            cx.notify();
        } else if !extend_selection && self.selection.is_some() {
            self.selection = None;
            cx.notify();
        }
    }

    fn move_cursor_right(&mut self, extend_selection: bool, cx: &mut Context<Self>) {
        let char_count = self.value.chars().count();
        if self.cursor_position < char_count {
            let old_pos = self.cursor_position;
            self.cursor_position += 1;

            if extend_selection {
                self.extend_selection(old_pos, self.cursor_position);
            } else if let Some(sel) = self.selection.take() {
                self.cursor_position = sel.end;
            }
            self.reset_cursor_blink();
            cx.notify();
        } else if !extend_selection && self.selection.is_some() {
            self.selection = None;
            cx.notify();
        }
    }

    fn move_to_start(&mut self, extend_selection: bool, cx: &mut Context<Self>) {
        let old_pos = self.cursor_position;
        self.cursor_position = 0;

        if extend_selection && old_pos > 0 {
            self.extend_selection(old_pos, 0);
        } else {
            self.selection = None;
        }
        self.reset_cursor_blink();
        cx.notify();
    }

    fn move_to_end(&mut self, extend_selection: bool, cx: &mut Context<Self>) {
        let old_pos = self.cursor_position;
        let char_count = self.value.chars().count();
        self.cursor_position = char_count;

        if extend_selection && old_pos < char_count {
            self.extend_selection(old_pos, char_count);
        } else {
            self.selection = None;
        }
        self.reset_cursor_blink();
        cx.notify();
    }

    /// Extend selection from anchor to new position
    fn extend_selection(&mut self, anchor: usize, new_pos: usize) {
        let (start, end) = if let Some(ref sel) = self.selection {
            if anchor == sel.end {
                if new_pos < sel.start {
                    (new_pos, sel.start)
                } else {
                    (sel.start, new_pos)
                }
            } else if new_pos > sel.end {
                (sel.end, new_pos)
            } else {
                (new_pos, sel.end)
            }
        } else {
            (anchor.min(new_pos), anchor.max(new_pos))
        };
        if start != end {
            self.selection = Some(start..end);
        } else {
            self.selection = None;
        }
    }

    /// Clear selection without other side effects
    fn clear_selection(&mut self, cx: &mut Context<Self>) -> bool {
        if self.selection.is_some() {
            self.selection = None;
            cx.notify();
            true
        } else {
            false
        }
    }

    fn select_all(&mut self, cx: &mut Context<Self>) {
        let char_count = self.value.chars().count();
        if char_count > 0 {
            self.selection = Some(0..char_count);
            self.cursor_position = char_count;
            self.reset_cursor_blink();
            cx.notify();
        }
    }

    fn byte_position_for_char(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn byte_range_for_chars(&self, char_range: &Range<usize>) -> Range<usize> {
        let start = self.byte_position_for_char(char_range.start);
        let end = self.byte_position_for_char(char_range.end);
        start..end
    }

    /// The string actually painted: bullets when masked.
    fn display_value(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Resolve a mouse position to a char offset using the stored layout.
    fn char_position_for_mouse(&self, position: Point<Pixels>) -> usize {
        let char_count = self.value.chars().count();
        if let Some(layout) = &self.text_layout {
            layout
                .index_for_position(position)
                .unwrap_or_else(|ix| ix)
                .min(char_count)
        } else {
            char_count
        }
    }

    /// Select the word around the given char position.
    fn select_word_at(&mut self, pos: usize, cx: &mut Context<Self>) {
        let (start, end) = find_word_boundaries(&self.value, pos);
        if start != end {
            self.selection = Some(start..end);
            self.cursor_position = end;
        }
        self.reset_cursor_blink();
        cx.notify();
    }

    /// Handle key down event. Returns KeyHandled indicating how the key was
    /// processed.
    fn handle_key_down(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) -> KeyHandled {
        let key = event.keystroke.key.as_str();
        let modifiers = &event.keystroke.modifiers;
        let extend_selection = modifiers.shift;

        match key {
            "backspace" => {
                self.delete_backward(cx);
                return KeyHandled::Handled;
            }
            "delete" => {
                self.delete_forward(cx);
                return KeyHandled::Handled;
            }
            "left" => {
                if modifiers.platform || modifiers.control {
                    self.move_to_start(extend_selection, cx);
                } else {
                    self.move_cursor_left(extend_selection, cx);
                }
                return KeyHandled::Handled;
            }
            "right" => {
                if modifiers.platform || modifiers.control {
                    self.move_to_end(extend_selection, cx);
                } else {
                    self.move_cursor_right(extend_selection, cx);
                }
                return KeyHandled::Handled;
            }
            "home" => {
                self.move_to_start(extend_selection, cx);
                return KeyHandled::Handled;
            }
            "end" => {
                self.move_to_end(extend_selection, cx);
                return KeyHandled::Handled;
            }
            "a" if modifiers.platform || modifiers.control => {
                self.select_all(cx);
                return KeyHandled::Handled;
            }
            "v" if modifiers.platform || modifiers.control => {
                if let Some(clipboard_item) = cx.read_from_clipboard() {
                    if let Some(text) = clipboard_item.text() {
                        // Only the first line; this is a single-line input
                        let line = text.lines().next().unwrap_or("");
                        if !line.is_empty() {
                            self.insert_text(line, cx);
                        }
                    }
                }
                return KeyHandled::Handled;
            }
            "c" if modifiers.platform || modifiers.control => {
                if let Some(ref sel) = self.selection {
                    let byte_range = self.byte_range_for_chars(sel);
                    let selected_text = &self.value[byte_range];
                    cx.write_to_clipboard(ClipboardItem::new_string(selected_text.to_string()));
                }
                return KeyHandled::Handled;
            }
            "x" if modifiers.platform || modifiers.control => {
                if let Some(ref sel) = self.selection {
                    let byte_range = self.byte_range_for_chars(sel);
                    let selected_text = &self.value[byte_range];
                    cx.write_to_clipboard(ClipboardItem::new_string(selected_text.to_string()));
                }
                if self.selection.is_some() {
                    self.delete_backward(cx);
                }
                return KeyHandled::Handled;
            }
            "escape" => {
                // If there's a selection, clear it. Otherwise let parent handle.
                if self.clear_selection(cx) {
                    return KeyHandled::Handled;
                }
                return KeyHandled::NotHandled;
            }
            "enter" => {
                cx.emit(InputSubmitEvent);
                return KeyHandled::NotHandled;
            }
            "tab" => {
                return KeyHandled::NotHandled;
            }
            // Skip modifier-only and function keys
            "shift" | "control" | "alt" | "meta" | "capslock" | "f1" | "f2" | "f3" | "f4"
            | "f5" | "f6" | "f7" | "f8" | "f9" | "f10" | "f11" | "f12" | "up" | "down"
            | "pageup" | "pagedown" => {
                return KeyHandled::Ignored;
            }
            _ => {}
        }

        // Handle character input via key_char (it's a String, not a char)
        if let Some(ref s) = event.keystroke.key_char {
            if !s.is_empty() && !s.chars().next().map_or(true, |c| c.is_control() && c != ' ') {
                self.insert_text(s, cx);
                return KeyHandled::Handled;
            }
        }

        KeyHandled::Ignored
    }
}

/// Find the word boundaries (char offsets) around `pos`.
/// Word characters are alphanumerics and `_`; everything else is a boundary.
fn find_word_boundaries(text: &str, pos: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return (0, 0);
    }
    let pos = pos.min(chars.len().saturating_sub(1));

    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    if !is_word(chars[pos]) {
        return (pos, pos + 1);
    }

    let mut start = pos;
    while start > 0 && is_word(chars[start - 1]) {
        start -= 1;
    }
    let mut end = pos + 1;
    while end < chars.len() && is_word(chars[end]) {
        end += 1;
    }
    (start, end)
}

impl Render for SimpleInputState {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let t = theme(cx);
        let focus_handle = self.focus_handle.clone();
        let is_focused = self.focus_handle.is_focused(window);
        let display = self.display_value();
        let placeholder = self.placeholder.clone();
        let cursor_visible = self.cursor_visible && is_focused;
        let cursor_color = rgb(t.text_primary);

        // The masked display is all single-byte chars in the same count as
        // the value, so char offsets map 1:1; byte offsets are computed on
        // the display string.
        let cursor_byte = display
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(display.len());

        let show_placeholder = display.is_empty() && !is_focused;

        let content: AnyElement = if show_placeholder {
            self.text_layout = None;
            div()
                .text_color(rgb(t.text_muted))
                .child(placeholder)
                .into_any_element()
        } else {
            let styled = if let Some(ref sel) = self.selection {
                let sel_start_byte = display
                    .char_indices()
                    .nth(sel.start)
                    .map(|(i, _)| i)
                    .unwrap_or(display.len());
                let sel_end_byte = display
                    .char_indices()
                    .nth(sel.end)
                    .map(|(i, _)| i)
                    .unwrap_or(display.len());
                let highlights = vec![(
                    sel_start_byte..sel_end_byte,
                    HighlightStyle {
                        background_color: Some(rgb(t.selection_bg).into()),
                        color: Some(rgb(t.selection_fg).into()),
                        ..Default::default()
                    },
                )];
                StyledText::new(display).with_highlights(highlights)
            } else {
                StyledText::new(display)
            };

            let layout = styled.layout().clone();
            self.text_layout = Some(layout.clone());

            div()
                .relative()
                .text_color(cursor_color)
                .child(styled)
                .child(cursor_canvas(layout, cursor_byte, cursor_visible, cursor_color))
                .into_any_element()
        };

        div()
            .id("simple-input")
            .track_focus(&focus_handle)
            .relative()
            .flex()
            .items_center()
            .gap(px(6.0))
            .w_full()
            .h(px(24.0))
            .px(px(8.0))
            .cursor_text()
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |this, event: &MouseDownEvent, window, cx| {
                    this.focus(window, cx);
                    let pos = this.char_position_for_mouse(event.position);

                    if event.click_count >= 3 {
                        this.is_selecting = false;
                        this.select_all(cx);
                    } else if event.click_count == 2 {
                        this.is_selecting = false;
                        this.select_word_at(pos, cx);
                    } else {
                        this.cursor_position = pos;
                        this.selection = None;
                        this.is_selecting = true;
                        this.select_anchor = pos;
                        this.reset_cursor_blink();
                        cx.notify();
                    }
                }),
            )
            .on_mouse_move(cx.listener(|this, event: &MouseMoveEvent, _window, cx| {
                if this.is_selecting {
                    if event.pressed_button != Some(MouseButton::Left) {
                        this.is_selecting = false;
                        return;
                    }
                    let pos = this.char_position_for_mouse(event.position);
                    this.cursor_position = pos;
                    let anchor = this.select_anchor;
                    if pos != anchor {
                        this.selection = Some(anchor.min(pos)..anchor.max(pos));
                    } else {
                        this.selection = None;
                    }
                    this.reset_cursor_blink();
                    cx.notify();
                }
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _event: &MouseUpEvent, _window, _cx| {
                    this.is_selecting = false;
                }),
            )
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, _window, cx| {
                if this.handle_key_down(event, cx) == KeyHandled::Handled {
                    cx.stop_propagation();
                }
            }))
            .child(content)
    }
}

/// Canvas element that paints a cursor line at the position from a TextLayout.
/// The layout is read during prepaint (after the sibling StyledText has been
/// laid out), and the cursor is painted during the paint phase.
fn cursor_canvas(
    layout: TextLayout,
    cursor_byte: usize,
    visible: bool,
    color: impl Into<Hsla> + Clone + 'static,
) -> impl IntoElement {
    let color: Hsla = color.into();
    canvas(
        move |_bounds, _window, _cx| {
            let pos = layout.position_for_index(cursor_byte);
            let line_h = layout.line_height();
            (pos, line_h)
        },
        move |_bounds, (cursor_pos, line_h), window, _cx| {
            if visible {
                if let Some(pos) = cursor_pos {
                    let cursor_h = px(14.0).min(line_h);
                    let y_offset = (line_h - cursor_h) * 0.5;
                    let adjusted = point(pos.x, pos.y + y_offset);
                    window.paint_quad(fill(Bounds::new(adjusted, size(px(1.0), cursor_h)), color));
                }
            }
        },
    )
    .absolute()
    .size_full()
}

impl_focusable!(SimpleInputState);

impl EventEmitter<InputChangedEvent> for SimpleInputState {}
impl EventEmitter<InputSubmitEvent> for SimpleInputState {}

/// Simple input element builder for use in render functions
pub struct SimpleInput {
    state: Entity<SimpleInputState>,
    text_size: Option<Pixels>,
}

impl SimpleInput {
    pub fn new(state: &Entity<SimpleInputState>) -> Self {
        Self {
            state: state.clone(),
            text_size: None,
        }
    }

    pub fn text_size(mut self, size: Pixels) -> Self {
        self.text_size = Some(size);
        self
    }
}

impl IntoElement for SimpleInput {
    type Element = Div;

    fn into_element(self) -> Self::Element {
        let state = self.state.clone();
        let text_size = self.text_size.unwrap_or(px(12.0));

        div().w_full().text_size(text_size).child(state)
    }
}

#[cfg(test)]
mod tests {
    use super::find_word_boundaries;

    #[test]
    fn word_boundaries_inside_word() {
        let (start, end) = find_word_boundaries("connect panel_host now", 10);
        assert_eq!((start, end), (8, 18));
    }

    #[test]
    fn word_boundaries_on_separator() {
        let (start, end) = find_word_boundaries("a b", 1);
        assert_eq!((start, end), (1, 2));
    }

    #[test]
    fn word_boundaries_empty_string() {
        assert_eq!(find_word_boundaries("", 0), (0, 0));
    }

    #[test]
    fn word_boundaries_past_end_clamps() {
        let (start, end) = find_word_boundaries("token", 99);
        assert_eq!((start, end), (0, 5));
    }
}
