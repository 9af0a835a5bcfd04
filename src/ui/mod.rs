pub mod card_list;
pub mod command_bar;
pub mod confirm_popup;
pub mod favorites;
pub mod film_detail;
pub mod films;
pub mod help;
pub mod input;
pub mod people;
pub mod person_detail;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::app::{App, AppMode, ViewState};
use crate::event::ViewKind;

use command_bar::CommandBar;
use confirm_popup::ConfirmPopup;
use favorites::FavoritesView;
use film_detail::FilmDetailView;
use films::FilmsView;
use help::HelpView;
use people::PeopleView;
use person_detail::PersonDetailView;
use status_bar::StatusBar;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: main content + status bar + optional input bar
    let has_input = matches!(app.mode, AppMode::Command | AppMode::Search);
    let bottom_height = if has_input { 2 } else { 1 };

    let [main_area, bottom_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(bottom_height)]).areas(area);

    if has_input {
        let [status_area, cmd_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(bottom_area);
        frame.render_widget(StatusBar::new(app), status_area);
        frame.render_widget(CommandBar::new(app), cmd_area);
    } else {
        frame.render_widget(StatusBar::new(app), bottom_area);
    }

    match app.view_stack.last() {
        Some(ViewState {
            kind: ViewKind::Help,
            ..
        }) => {
            // Render the view underneath first, then overlay help.
            if let Some(below) = app.view_stack.iter().rev().nth(1) {
                render_view(frame, app, below, main_area);
            }
            frame.render_widget(HelpView::new(), main_area);
        }
        Some(top) => render_view(frame, app, top, main_area),
        None => {}
    }

    if app.mode == AppMode::Confirm
        && let Some(ref film) = app.pending_removal
    {
        frame.render_widget(ConfirmPopup::remove_favorite(&film.title), frame.area());
    }
}

fn render_view(frame: &mut Frame, app: &App, view: &ViewState, area: Rect) {
    match &view.kind {
        ViewKind::Films => {
            frame.render_widget(
                FilmsView::new(&app.films, view.selected_index)
                    .favorites(app.favorites.favorites()),
                area,
            );
        }
        ViewKind::People => {
            frame.render_widget(PeopleView::new(&app.people, view.selected_index), area);
        }
        ViewKind::Favorites => {
            frame.render_widget(
                FavoritesView::new(
                    app.favorites.favorites(),
                    app.favorites.count_label(),
                    view.selected_index,
                )
                .error(app.favorites_error.as_deref()),
                area,
            );
        }
        ViewKind::FilmDetail(_) => {
            frame.render_widget(
                FilmDetailView::new(&app.film_detail, app.film_is_favorite),
                area,
            );
        }
        ViewKind::PersonDetail(_) => {
            frame.render_widget(PersonDetailView::new(&app.person_detail), area);
        }
        ViewKind::Help => {}
    }
}
