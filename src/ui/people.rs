use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use crate::api::types::{Gender, Person};
use crate::format::{format_attribute, format_height, format_mass, pluralize, truncate};
use crate::state::ListState;
use crate::ui::card_list::CardList;

/// Paginated people list with the live search summary in the title.
pub struct PeopleView<'a> {
    people: &'a ListState<Person>,
    selected_index: usize,
}

impl<'a> PeopleView<'a> {
    pub fn new(people: &'a ListState<Person>, selected_index: usize) -> Self {
        Self {
            people,
            selected_index,
        }
    }
}

impl Widget for PeopleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(4) as usize;
        let cards = self
            .people
            .filtered()
            .into_iter()
            .map(|person| person_card(person, width))
            .collect();

        let mut title = format!(
            "People \u{00b7} {}",
            self.people.result_summary("person", "people")
        );
        if let Some(total) = self.people.total()
            && self.people.has_more()
        {
            title.push_str(&format!(" (of {total})"));
        }
        if self.people.is_refreshing() {
            title.push_str(" \u{00b7} refreshing...");
        }

        let empty = if self.people.is_loading() {
            "Loading people..."
        } else if self.people.query().is_empty() {
            "No people"
        } else {
            "No one matches the search"
        };

        let footer = if self.people.is_loading_more() {
            Some(Line::styled(
                "Loading more...",
                Style::default().fg(Color::Yellow),
            ))
        } else if self.people.has_more() {
            Some(Line::styled(
                "n: load more",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            None
        };

        CardList::new(title, cards, self.selected_index)
            .empty_message(empty)
            .error(self.people.error())
            .footer(footer)
            .render(area, buf);
    }
}

fn gender_symbol(gender: Gender) -> (&'static str, Color) {
    match gender {
        Gender::Male => ("\u{2642}", Color::Blue),
        Gender::Female => ("\u{2640}", Color::Magenta),
        Gender::NotApplicable => ("\u{2699}", Color::Gray),
        Gender::Other => ("?", Color::Gray),
    }
}

pub fn person_card(person: &Person, width: usize) -> Vec<Line<'static>> {
    let (symbol, color) = gender_symbol(person.gender_kind());
    let header = Line::from(vec![
        Span::styled(
            truncate(&person.name, width.saturating_sub(3)),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(symbol, Style::default().fg(color)),
    ]);

    let stats = format!(
        "Born {} \u{00b7} {} \u{00b7} {}",
        format_attribute(&person.birth_year),
        format_height(&person.height),
        format_mass(&person.mass),
    );

    vec![
        header,
        Line::styled(truncate(&stats, width), Style::default().fg(Color::Gray)),
        Line::styled(
            format!(
                "Appears in {}",
                pluralize(person.films.len(), "film", "films")
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn card_summarizes_person() {
        let luke: Person = serde_json::from_value(serde_json::json!({
            "name": "Luke Skywalker",
            "gender": "male",
            "birth_year": "19BBY",
            "height": "172",
            "mass": "77",
            "films": ["https://swapi.info/api/films/1", "https://swapi.info/api/films/2"]
        }))
        .unwrap();

        let lines = person_card(&luke, 80);
        assert_eq!(line_text(&lines[0]), "Luke Skywalker \u{2642}");
        assert_eq!(line_text(&lines[1]), "Born 19BBY \u{00b7} 172 cm \u{00b7} 77 kg");
        assert_eq!(line_text(&lines[2]), "Appears in 2 films");
    }

    #[test]
    fn card_reads_unknown_measurements() {
        let droid: Person = serde_json::from_value(serde_json::json!({
            "name": "R2-D2",
            "gender": "n/a",
            "birth_year": "unknown",
            "height": "96",
            "mass": "unknown"
        }))
        .unwrap();

        let lines = person_card(&droid, 80);
        assert_eq!(line_text(&lines[1]), "Born Unknown \u{00b7} 96 cm \u{00b7} Unknown");
        assert_eq!(line_text(&lines[2]), "Appears in 0 films");
    }
}
