use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Widget;

use crate::api::types::Film;
use crate::ui::card_list::CardList;
use crate::ui::films::film_card;

/// Favorite films, as last read from the store.
pub struct FavoritesView<'a> {
    films: &'a [Film],
    count_label: String,
    selected_index: usize,
    error: Option<&'a str>,
}

impl<'a> FavoritesView<'a> {
    pub fn new(films: &'a [Film], count_label: String, selected_index: usize) -> Self {
        Self {
            films,
            count_label,
            selected_index,
            error: None,
        }
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

impl Widget for FavoritesView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(4) as usize;
        let cards = self
            .films
            .iter()
            .map(|film| film_card(film, width, true))
            .collect();

        let footer = (!self.films.is_empty()).then(|| {
            Line::styled(
                "Enter: open \u{00b7} d: remove",
                Style::default().fg(Color::DarkGray),
            )
        });

        CardList::new(
            format!("Favorites \u{00b7} {}", self.count_label),
            cards,
            self.selected_index,
        )
        .empty_message("No favorites yet. Press f on a film to add it.")
        .error(self.error)
        .footer(footer)
        .render(area, buf);
    }
}
