use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::api::types::Person;
use crate::format::{format_attribute, format_height, format_mass, pluralize};
use crate::state::DetailState;

pub struct PersonDetailView<'a> {
    pub detail: &'a DetailState<Person>,
}

impl<'a> PersonDetailView<'a> {
    pub fn new(detail: &'a DetailState<Person>) -> Self {
        Self { detail }
    }
}

impl Widget for PersonDetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.detail.item() {
            Some(person) => format!(" {} ", person.name),
            None => " Person ".to_owned(),
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

        let Some(person) = self.detail.item() else {
            let lines = match self.detail.error() {
                Some(err) => vec![
                    Line::styled(err.to_owned(), Style::default().fg(Color::Red)),
                    Line::styled("Press r to retry", Style::default().fg(Color::DarkGray)),
                ],
                None => vec![Line::styled(
                    "Loading person...",
                    Style::default().fg(Color::DarkGray),
                )],
            };
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(inner, buf);
            return;
        };

        let section = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::styled("Physical characteristics", section),
            field("Height", format_height(&person.height)),
            field("Mass", format_mass(&person.mass)),
            field("Hair", format_attribute(&person.hair_color)),
            field("Eyes", format_attribute(&person.eye_color)),
            field("Skin", format_attribute(&person.skin_color)),
            Line::from(""),
            Line::styled("Personal", section),
            field("Born", format_attribute(&person.birth_year)),
            field("Gender", format_attribute(&person.gender)),
            Line::from(""),
            Line::styled("Appearances", section),
            field("Films", pluralize(person.films.len(), "film", "films")),
            field(
                "Vehicles",
                pluralize(person.vehicles.len(), "vehicle", "vehicles"),
            ),
            field(
                "Starships",
                pluralize(person.starships.len(), "starship", "starships"),
            ),
        ];

        if person.created.is_some() || person.edited.is_some() {
            lines.push(Line::from(""));
            lines.push(Line::styled("Record", section));
            if let Some(created) = person.created {
                lines.push(field("Created", created.format("%B %-d, %Y").to_string()));
            }
            if let Some(edited) = person.edited {
                lines.push(field("Edited", edited.format("%B %-d, %Y").to_string()));
            }
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<11}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityResponse;

    #[test]
    fn renders_characteristics_and_record_dates() {
        let mut detail = DetailState::<Person>::default();
        let req = detail.begin(Some("1")).unwrap();
        let luke: Person = serde_json::from_value(serde_json::json!({
            "name": "Luke Skywalker",
            "height": "172",
            "mass": "77",
            "hair_color": "blond",
            "eye_color": "blue",
            "skin_color": "fair",
            "birth_year": "19BBY",
            "gender": "male",
            "films": ["1", "2", "3", "6"],
            "created": "2014-12-09T13:50:51.644000Z",
            "edited": "2014-12-20T21:17:56.891000Z"
        }))
        .unwrap();
        detail.apply(EntityResponse {
            generation: req.generation,
            result: Ok(luke),
        });

        let area = Rect::new(0, 0, 60, 24);
        let mut buf = Buffer::empty(area);
        PersonDetailView::new(&detail).render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();

        assert!(text.contains("Luke Skywalker"));
        assert!(text.contains("172 cm"));
        assert!(text.contains("Blond"));
        assert!(text.contains("4 films"));
        assert!(text.contains("December 9, 2014"));
    }

    #[test]
    fn renders_error_with_retry_hint() {
        let mut detail = DetailState::<Person>::default();
        let req = detail.begin(Some("99")).unwrap();
        detail.apply(EntityResponse {
            generation: req.generation,
            result: Err(std::sync::Arc::new("API error (status 404): Not found".into())),
        });

        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        PersonDetailView::new(&detail).render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("status 404"));
        assert!(text.contains("Press r to retry"));
    }
}
