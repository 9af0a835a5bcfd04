use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppMode};
use crate::event::ViewKind;
use crate::format::truncate;

/// Bottom status bar showing mode, current view, and status messages.
pub struct StatusBar<'a> {
    pub app: &'a App,
}

impl<'a> StatusBar<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

fn view_name(app: &App) -> String {
    match app.current_view() {
        Some(ViewKind::Films) => "Films".to_string(),
        Some(ViewKind::People) => "People".to_string(),
        Some(ViewKind::Favorites) => format!("Favorites ({})", app.favorites.favorites().len()),
        Some(ViewKind::FilmDetail(id)) => format!("Film {id}"),
        Some(ViewKind::PersonDetail(id)) => format!("Person {id}"),
        Some(ViewKind::Help) => "Help".to_string(),
        None => "holocron".to_string(),
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        // Background
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_style(bg_style);
        }

        let mut spans = Vec::new();

        // Mode indicator
        let mode_str = match self.app.mode {
            AppMode::Normal => " NORMAL ",
            AppMode::Command => " COMMAND ",
            AppMode::Search => " SEARCH ",
            AppMode::Confirm => " CONFIRM ",
        };
        let mode_style = Style::default()
            .bg(match self.app.mode {
                AppMode::Normal => Color::Blue,
                AppMode::Command => Color::Magenta,
                AppMode::Search => Color::Yellow,
                AppMode::Confirm => Color::Red,
            })
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        spans.push(Span::styled(mode_str, mode_style));
        spans.push(Span::raw(" "));

        spans.push(Span::styled(view_name(self.app), bg_style));

        if self.app.is_loading() {
            spans.push(Span::styled(
                " [loading...]",
                Style::default().bg(Color::DarkGray).fg(Color::Yellow),
            ));
        }

        // Status message (right-aligned)
        if let Some(ref msg) = self.app.status_message {
            let left_width: usize = spans.iter().map(|s| s.width()).sum();
            let room = (area.width as usize).saturating_sub(left_width + 1);
            let msg = truncate(msg, room);
            let padding = (area.width as usize).saturating_sub(left_width + msg.width());
            if padding > 0 {
                spans.push(Span::styled(" ".repeat(padding), bg_style));
            }
            spans.push(Span::styled(
                msg,
                Style::default().bg(Color::DarkGray).fg(Color::LightYellow),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
