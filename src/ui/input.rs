use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

/// A simple single-line text input renderer.
///
/// Renders the prompt + text content, with a cursor indicator at the end.
pub struct TextInput<'a> {
    pub prompt: &'a str,
    pub text: &'a str,
    pub style: Style,
}

impl<'a> TextInput<'a> {
    pub fn new(prompt: &'a str, text: &'a str) -> Self {
        Self {
            prompt,
            text,
            style: Style::default().fg(Color::White),
        }
    }
}

/// The rightmost part of `display` that fits in `max_width` columns.
fn tail(display: &str, max_width: usize) -> &str {
    let mut used = 0;
    let mut start = display.len();
    for (idx, c) in display.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        used += w;
        start = idx;
    }
    &display[start..]
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let display = format!("{}{}\u{2588}", self.prompt, self.text);
        // If the display is wider than the area, show the rightmost portion.
        let visible = tail(&display, area.width as usize);

        buf.set_string(area.x, area.y, visible, self.style);
    }
}
