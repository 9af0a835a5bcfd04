use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

/// A centered yes/no prompt rendered on top of the current view.
pub struct ConfirmPopup<'a> {
    title: &'a str,
    question: String,
}

impl<'a> ConfirmPopup<'a> {
    pub fn new(title: &'a str, question: String) -> Self {
        Self { title, question }
    }

    pub fn remove_favorite(film_title: &str) -> Self {
        Self::new(
            " Remove Favorite ",
            format!("Remove \"{film_title}\" from favorites?"),
        )
    }
}

impl Widget for ConfirmPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 50u16.min(area.width.saturating_sub(4));
        let inner_width = width.saturating_sub(2) as usize;

        let text_lines = if inner_width == 0 {
            1
        } else {
            self.question.chars().count().div_ceil(inner_width).max(1)
        };
        // border top/bottom, blank line, hint line
        let height = (text_lines as u16 + 4).min(area.height.saturating_sub(2));

        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let panel = Rect::new(x, y, width, height);

        Clear.render(panel, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title)
            .title_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::Yellow));

        let inner = block.inner(panel);
        block.render(panel, buf);

        if inner.height < 2 {
            return;
        }
        let text_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
        let hint_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);

        Paragraph::new(self.question)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);

        let hint = Line::from(vec![
            Span::styled(
                " y",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(": remove  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                "n/Esc",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(": keep", Style::default().fg(Color::DarkGray)),
        ]);
        Paragraph::new(hint).render(hint_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_the_film_being_removed() {
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        ConfirmPopup::remove_favorite("A New Hope").render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("Remove \"A New Hope\" from favorites?"));
        assert!(text.contains("y: remove"));
    }
}
