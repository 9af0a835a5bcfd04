use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::api::types::Film;
use crate::format::{format_date, truncate};
use crate::state::ListState;
use crate::ui::card_list::CardList;

/// Film list view.
pub struct FilmsView<'a> {
    films: &'a ListState<Film>,
    favorites: &'a [Film],
    selected_index: usize,
}

impl<'a> FilmsView<'a> {
    pub fn new(films: &'a ListState<Film>, selected_index: usize) -> Self {
        Self {
            films,
            favorites: &[],
            selected_index,
        }
    }

    /// Films to mark with a heart.
    pub fn favorites(mut self, favorites: &'a [Film]) -> Self {
        self.favorites = favorites;
        self
    }
}

impl Widget for FilmsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(4) as usize;
        let cards = self
            .films
            .filtered()
            .into_iter()
            .map(|film| {
                let favorite = self
                    .favorites
                    .iter()
                    .any(|f| f.episode_id == film.episode_id);
                film_card(film, width, favorite)
            })
            .collect();

        let title = if self.films.is_refreshing() {
            "Films (refreshing...)".to_owned()
        } else {
            format!("Films \u{00b7} {}", self.films.result_summary("film", "films"))
        };

        let empty = if self.films.is_loading() {
            "Loading films..."
        } else if self.films.query().is_empty() {
            "No films"
        } else {
            "No films match the search"
        };

        CardList::new(title, cards, self.selected_index)
            .empty_message(empty)
            .error(self.films.error())
            .render(area, buf);
    }
}

/// Two-to-three line summary of a film, shared with the favorites view.
pub fn film_card(film: &Film, width: usize, favorite: bool) -> Vec<Line<'static>> {
    let badge = Span::styled(
        format!(" EP {} ", film.episode_id),
        Style::default()
            .bg(Color::Yellow)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );
    let mut header = vec![
        badge,
        Span::raw(" "),
        Span::styled(
            truncate(&film.title, width.saturating_sub(10)),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if favorite {
        header.push(Span::styled(" \u{2665}", Style::default().fg(Color::Red)));
    }

    let mut lines = vec![Line::from(header)];

    if !film.release_date.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Released {}", format_date(&film.release_date)),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let credits = match (film.director.is_empty(), film.producer.is_empty()) {
        (false, false) => format!(
            "Directed by {} \u{00b7} Produced by {}",
            film.director, film.producer
        ),
        (false, true) => format!("Directed by {}", film.director),
        (true, false) => format!("Produced by {}", film.producer),
        (true, true) => String::new(),
    };
    if !credits.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate(&credits, width),
            Style::default().fg(Color::Gray),
        )));
    }

    lines
}
