use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::api::types::Film;
use crate::format::{format_date, pluralize};
use crate::state::DetailState;

/// Film detail view: credits, related counts, and the opening crawl.
pub struct FilmDetailView<'a> {
    pub detail: &'a DetailState<Film>,
    pub favorite: bool,
}

impl<'a> FilmDetailView<'a> {
    pub fn new(detail: &'a DetailState<Film>, favorite: bool) -> Self {
        Self { detail, favorite }
    }
}

impl Widget for FilmDetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.detail.item() {
            Some(film) => format!(" Episode {}: {} ", film.episode_id, film.title),
            None => " Film ".to_owned(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(film) = self.detail.item() else {
            let lines = match self.detail.error() {
                Some(err) => vec![
                    Line::styled(err.to_owned(), Style::default().fg(Color::Red)),
                    Line::styled("Press r to retry", Style::default().fg(Color::DarkGray)),
                ],
                None => vec![Line::styled(
                    "Loading film...",
                    Style::default().fg(Color::DarkGray),
                )],
            };
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(inner, buf);
            return;
        };

        let [info_area, crawl_area] =
            Layout::vertical([Constraint::Length(7), Constraint::Min(1)]).areas(inner);

        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::White);

        let heart = if self.favorite {
            Span::styled("\u{2665} Favorite", Style::default().fg(Color::Red))
        } else {
            Span::styled("\u{2661} Not a favorite", label)
        };

        let counts = [
            (film.characters.len(), "character", "characters"),
            (film.planets.len(), "planet", "planets"),
            (film.starships.len(), "starship", "starships"),
            (film.vehicles.len(), "vehicle", "vehicles"),
            (film.species.len(), "species", "species"),
        ]
        .iter()
        .map(|&(n, one, many)| pluralize(n, one, many))
        .collect::<Vec<_>>()
        .join(" \u{00b7} ");

        let lines = vec![
            Line::from(vec![heart, Span::styled("  (f to toggle)", label)]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Released  ", label),
                Span::styled(format_date(&film.release_date), value),
            ]),
            Line::from(vec![
                Span::styled("Director  ", label),
                Span::styled(film.director.clone(), value),
            ]),
            Line::from(vec![
                Span::styled("Producer  ", label),
                Span::styled(film.producer.clone(), value),
            ]),
            Line::from(""),
            Line::styled(counts, Style::default().fg(Color::Cyan)),
        ];
        Paragraph::new(lines).render(info_area, buf);

        let crawl_block = Block::default()
            .borders(Borders::TOP)
            .title(" Opening Crawl ")
            .title_style(label)
            .border_style(label);
        let crawl_inner = crawl_block.inner(crawl_area);
        crawl_block.render(crawl_area, buf);

        // The API separates crawl lines with "\r\n".
        let crawl: Vec<Line<'_>> = film
            .opening_crawl
            .lines()
            .map(|line| Line::styled(line.trim_end(), Style::default().fg(Color::Yellow)))
            .collect();
        Paragraph::new(crawl)
            .wrap(Wrap { trim: true })
            .render(crawl_inner, buf);
    }
}
