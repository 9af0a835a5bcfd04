use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppMode};
use crate::ui::input::TextInput;

/// Command/search input bar rendered at the bottom when in command or search mode.
///
/// While searching, the live match count sits on the right.
pub struct CommandBar<'a> {
    pub app: &'a App,
}

impl<'a> CommandBar<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

fn render_search(input: &str, summary: Option<String>, area: Rect, buf: &mut Buffer) {
    let summary = summary.filter(|s| s.width() + 4 < area.width as usize / 2);
    let Some(summary) = summary else {
        TextInput::new("/", input).render(area, buf);
        return;
    };

    let [input_area, summary_area] = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(summary.width() as u16 + 1),
    ])
    .areas(area);
    TextInput::new("/", input).render(input_area, buf);
    Span::styled(summary, Style::default().fg(Color::DarkGray)).render(summary_area, buf);
}

impl Widget for CommandBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.app.mode {
            AppMode::Command => {
                TextInput::new(":", &self.app.command_input).render(area, buf);
            }
            AppMode::Search => {
                render_search(&self.app.search_input, self.app.search_summary(), area, buf);
            }
            AppMode::Normal | AppMode::Confirm => {}
        }
    }
}
