use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

/// A scrollable list of multi-line cards with selection highlight.
///
/// Used by the film list, people list, and favorites views.
pub struct CardList<'a> {
    pub title: String,
    pub cards: Vec<Vec<Line<'a>>>,
    pub selected_index: usize,
    pub empty_message: &'a str,
    pub error: Option<&'a str>,
    pub footer: Option<Line<'a>>,
}

impl<'a> CardList<'a> {
    pub fn new(title: impl Into<String>, cards: Vec<Vec<Line<'a>>>, selected_index: usize) -> Self {
        Self {
            title: title.into(),
            cards,
            selected_index,
            empty_message: "Nothing to display",
            error: None,
            footer: None,
        }
    }

    pub fn empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = message;
        self
    }

    /// Failure of the last load. Shown in place of the cards when there are
    /// none, otherwise pinned to the bottom.
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// A line pinned under the last card (e.g. "Loading more...").
    pub fn footer(mut self, footer: Option<Line<'a>>) -> Self {
        self.footer = footer;
        self
    }
}

impl Widget for CardList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::DarkGray));

        let mut inner = block.inner(area);
        block.render(area, buf);

        if self.cards.is_empty()
            && let Some(error) = self.error
        {
            let lines = vec![
                Line::styled(error.to_owned(), Style::default().fg(Color::Red)),
                Line::from(""),
                Line::styled(
                    "Press r to retry",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            ];
            let text_area = Rect::new(
                inner.x + 1,
                inner.y,
                inner.width.saturating_sub(1),
                inner.height,
            );
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(text_area, buf);
            return;
        }

        let footer = match self.error {
            Some(error) => Some(Line::styled(
                format!("{error} (r to retry)"),
                Style::default().fg(Color::Red),
            )),
            None => self.footer,
        };

        if let Some(footer) = footer
            && inner.height > 1
        {
            let footer_y = inner.y + inner.height - 1;
            buf.set_line(inner.x + 1, footer_y, &footer, inner.width.saturating_sub(1));
            inner.height -= 1;
        }

        if self.cards.is_empty() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                self.empty_message,
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let content_width = inner.width.saturating_sub(1); // 1 char left margin

        // Card height plus one separator row.
        let heights: Vec<u16> = self
            .cards
            .iter()
            .map(|card| card.len() as u16 + 1)
            .collect();

        let scroll_start = compute_scroll_start(&heights, self.selected_index, inner.height);

        let mut y = inner.y;
        let mut idx = scroll_start;
        while idx < self.cards.len() && y < inner.y + inner.height {
            let card_h = heights[idx];
            let remaining = inner.y + inner.height - y;
            let render_h = card_h.min(remaining);
            let card_area = Rect::new(inner.x + 1, y, content_width, render_h.saturating_sub(1));

            let selected = idx == self.selected_index;
            let mut paragraph = Paragraph::new(self.cards[idx].clone());
            if selected {
                paragraph = paragraph.style(Style::default().bg(Color::Rgb(30, 30, 46)));
                buf.set_string(inner.x, y, "\u{258c}", Style::default().fg(Color::Yellow));
            }
            paragraph.render(card_area, buf);

            y += render_h;

            if y < inner.y + inner.height && idx + 1 < self.cards.len() {
                let sep = "\u{2500}".repeat(content_width as usize);
                buf.set_string(
                    inner.x + 1,
                    y.saturating_sub(1),
                    &sep,
                    Style::default().fg(Color::DarkGray),
                );
            }

            idx += 1;
        }
    }
}

/// Find the smallest scroll start index so that the selected item fits
/// within the available height.
fn compute_scroll_start(heights: &[u16], selected: usize, available: u16) -> usize {
    if heights.is_empty() {
        return 0;
    }

    let selected = selected.min(heights.len() - 1);
    if available == 0 {
        return selected;
    }

    // Always include the selected card and pack as many previous cards as fit
    // above it.
    let mut start = selected;
    let mut used = heights[selected];

    while start > 0 {
        let next = used.saturating_add(heights[start - 1]);
        if next > available {
            break;
        }
        start -= 1;
        used = next;
    }

    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_empty_list() {
        assert_eq!(compute_scroll_start(&[], 0, 10), 0);
    }

    #[test]
    fn advances_when_selected_is_below_exactly_full_window() {
        let heights = [5, 5, 5];
        assert_eq!(compute_scroll_start(&heights, 2, 10), 1);
    }

    #[test]
    fn keeps_selected_card_visible_when_taller_than_viewport() {
        let heights = [3, 12, 4];
        assert_eq!(compute_scroll_start(&heights, 1, 8), 1);
    }

    #[test]
    fn clamps_selected_index_to_last_card() {
        let heights = [2, 2, 2];
        assert_eq!(compute_scroll_start(&heights, 99, 4), 1);
    }

    #[test]
    fn renders_empty_message() {
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        CardList::new("Films", Vec::new(), 0)
            .empty_message("Loading...")
            .render(area, &mut buf);
        let row: String = (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(row.contains("Loading..."));
    }

    fn buffer_text(buf: &Buffer, area: Rect) -> String {
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn renders_retry_hint_when_first_load_failed() {
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        CardList::new("People", Vec::new(), 0)
            .error(Some("connection refused"))
            .render(area, &mut buf);
        let text = buffer_text(&buf, area);
        assert!(text.contains("connection refused"));
        assert!(text.contains("Press r to retry"));
    }

    #[test]
    fn renders_selected_card_and_footer() {
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        let cards = vec![
            vec![Line::from("Luke Skywalker")],
            vec![Line::from("C-3PO")],
        ];
        CardList::new("People", cards, 1)
            .footer(Some(Line::from("Loading more...")))
            .render(area, &mut buf);
        let text = buffer_text(&buf, area);
        assert!(text.contains("Luke Skywalker"));
        assert!(text.contains("C-3PO"));
        assert!(text.contains("Loading more..."));
        assert_eq!(buf[(1, 3)].symbol(), "\u{258c}");
    }
}
