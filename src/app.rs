use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::api::SwapiClient;
use crate::api::types::{Film, Person};
use crate::command::{self, Command};
use crate::config::{AppConfig, DefaultView};
use crate::event::{AppEvent, Event, EventHandler, ViewKind};
use crate::state::{DetailState, FavoritesController, ListState, detail, list};
use crate::storage::JsonFileStore;
use crate::ui;

// ---------------------------------------------------------------------------
// App mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Command,
    Search,
    /// Waiting for y/n on `pending_removal`.
    Confirm,
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

pub struct ViewState {
    pub kind: ViewKind,
    pub selected_index: usize,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: AppConfig,

    // View system
    pub view_stack: Vec<ViewState>,
    pub mode: AppMode,

    // Data state
    pub films: ListState<Film>,
    pub people: ListState<Person>,
    pub film_detail: DetailState<Film>,
    pub person_detail: DetailState<Person>,
    pub film_is_favorite: bool,
    pub favorites: FavoritesController<JsonFileStore>,
    pub favorites_error: Option<String>,
    pub pending_removal: Option<Film>,

    // Input state
    pub command_input: String,
    pub search_input: String,

    // API client (shared with spawned tasks)
    api_client: Arc<SwapiClient>,

    // Status
    pub status_message: Option<String>,
}

impl App {
    pub fn new(
        config: AppConfig,
        api_client: SwapiClient,
        favorites: FavoritesController<JsonFileStore>,
    ) -> Self {
        let events = EventHandler::new(config.tick_rate_fps);
        Self::with_events(config, api_client, favorites, events)
    }

    fn with_events(
        config: AppConfig,
        api_client: SwapiClient,
        mut favorites: FavoritesController<JsonFileStore>,
        events: EventHandler,
    ) -> Self {
        // Loaded up front so the film list can mark favorites.
        let favorites_error = favorites.load().err().map(|e| {
            tracing::warn!("could not read favorites: {e}");
            e.to_string()
        });

        let root = match config.default_view {
            DefaultView::Films => ViewKind::Films,
            DefaultView::People => ViewKind::People,
            DefaultView::Favorites => ViewKind::Favorites,
        };

        Self {
            running: true,
            events,
            config,
            view_stack: vec![ViewState {
                kind: root,
                selected_index: 0,
            }],
            mode: AppMode::Normal,
            films: ListState::new(),
            people: ListState::new(),
            film_detail: DetailState::default(),
            person_detail: DetailState::default(),
            film_is_favorite: false,
            favorites,
            favorites_error,
            pending_removal: None,
            command_input: String::new(),
            search_input: String::new(),
            api_client: Arc::new(api_client),
            status_message: None,
        }
    }

    // -- Main event loop ----------------------------------------------------

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        if let Some(root) = self.current_view().cloned() {
            self.enter_view(&root);
        }

        while self.running {
            terminal.draw(|frame| self.draw(frame))?;
            match self.events.next().await? {
                Event::Tick => {}
                Event::Crossterm(event) => {
                    if let crossterm::event::Event::Key(key) = event
                        && key.kind == crossterm::event::KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                Event::App(app_event) => self.handle_app_event(*app_event),
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        ui::draw(frame, self);
    }

    // -- View stack ---------------------------------------------------------

    pub fn current_view(&self) -> Option<&ViewKind> {
        self.view_stack.last().map(|vs| &vs.kind)
    }

    pub fn push_view(&mut self, kind: ViewKind) {
        self.view_stack.push(ViewState {
            kind: kind.clone(),
            selected_index: 0,
        });
        self.enter_view(&kind);
    }

    pub fn pop_view(&mut self) {
        if self.view_stack.len() <= 1 {
            return;
        }
        if let Some(popped) = self.view_stack.pop() {
            self.leave_view(&popped.kind);
        }
        if let Some(revealed) = self.current_view().cloned() {
            self.enter_view(&revealed);
        }
    }

    /// Replace the whole stack with a root view.
    fn switch_view(&mut self, kind: ViewKind) {
        if self.view_stack.len() == 1 && self.current_view() == Some(&kind) {
            return;
        }
        while let Some(vs) = self.view_stack.pop() {
            self.leave_view(&vs.kind);
        }
        self.push_view(kind);
    }

    /// Called whenever a view becomes the top of the stack. Must be safe to
    /// call repeatedly: list controllers ignore repeated initialization and
    /// details only refetch when they are showing a different entity.
    fn enter_view(&mut self, kind: &ViewKind) {
        match kind {
            ViewKind::Films => {
                let url = self.api_client.films_url();
                if let Some(req) = self.films.initialize(&url) {
                    self.events.send(AppEvent::FetchFilms(req));
                }
            }
            ViewKind::People => {
                let url = self.api_client.people_url();
                if let Some(req) = self.people.initialize(&url) {
                    self.events.send(AppEvent::FetchPeople(req));
                }
            }
            ViewKind::Favorites => self.reload_favorites(),
            ViewKind::FilmDetail(id) => {
                if self.film_detail.id() != Some(id.as_str())
                    && let Some(req) = self.film_detail.begin(Some(id))
                {
                    self.film_is_favorite = false;
                    self.events.send(AppEvent::FetchFilm(req));
                }
            }
            ViewKind::PersonDetail(id) => {
                if self.person_detail.id() != Some(id.as_str())
                    && let Some(req) = self.person_detail.begin(Some(id))
                {
                    self.events.send(AppEvent::FetchPerson(req));
                }
            }
            ViewKind::Help => {}
        }
    }

    /// Called when a view is removed from the stack.
    fn leave_view(&mut self, kind: &ViewKind) {
        match kind {
            ViewKind::Films => self.films.dispose(),
            ViewKind::People => self.people.dispose(),
            ViewKind::FilmDetail(_) => {
                self.film_detail.clear();
                self.film_is_favorite = false;
            }
            ViewKind::PersonDetail(_) => self.person_detail.clear(),
            ViewKind::Favorites | ViewKind::Help => {}
        }
    }

    // -- Key event routing --------------------------------------------------

    fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl-C always quits.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            self.events.send(AppEvent::Quit);
            return;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Command => self.handle_command_key(key),
            AppMode::Search => self.handle_search_key(key),
            AppMode::Confirm => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        if self.current_view() == Some(&ViewKind::Help) {
            if matches!(
                key.code,
                KeyCode::Char('q' | '?') | KeyCode::Esc | KeyCode::Enter
            ) {
                self.events.send(AppEvent::PopView);
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.view_stack.len() > 1 {
                    self.events.send(AppEvent::PopView);
                } else {
                    self.events.send(AppEvent::Quit);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection_down();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection_up();
            }
            KeyCode::Enter => {
                self.open_selected();
            }
            KeyCode::Char('/') => {
                self.start_search();
            }
            KeyCode::Char(':') => {
                self.mode = AppMode::Command;
                self.command_input.clear();
            }
            KeyCode::Char('?') => {
                self.events.send(AppEvent::PushView(ViewKind::Help));
            }
            KeyCode::Char('1') => {
                self.events.send(AppEvent::SwitchView(ViewKind::Films));
            }
            KeyCode::Char('2') => {
                self.events.send(AppEvent::SwitchView(ViewKind::People));
            }
            KeyCode::Char('3') => {
                self.events.send(AppEvent::SwitchView(ViewKind::Favorites));
            }
            KeyCode::Char('n') => {
                self.load_next_page();
            }
            KeyCode::Char('r') => {
                self.refresh_current();
            }
            KeyCode::Char('f') => {
                self.toggle_favorite();
            }
            KeyCode::Char('d') => {
                self.confirm_removal();
            }
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.command_input.clear();
            }
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
                self.execute_command();
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(c) => {
                self.command_input.push(c);
            }
            _ => {}
        }
    }

    /// The search filter is applied on every keystroke.
    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.search_input.clear();
                self.apply_search("");
            }
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                let query = self.search_input.clone();
                self.apply_search(&query);
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                let query = self.search_input.clone();
                self.apply_search(&query);
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y' | 'Y') => {
                self.mode = AppMode::Normal;
                if let Some(film) = self.pending_removal.take() {
                    self.remove_favorite(&film);
                }
            }
            KeyCode::Char('n' | 'N' | 'q') | KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.pending_removal = None;
            }
            _ => {}
        }
    }

    // -- Command execution --------------------------------------------------

    fn execute_command(&mut self) {
        let input = std::mem::take(&mut self.command_input);
        match command::parse_command(&input) {
            Some(Command::Films) => {
                self.events.send(AppEvent::SwitchView(ViewKind::Films));
            }
            Some(Command::People) => {
                self.events.send(AppEvent::SwitchView(ViewKind::People));
            }
            Some(Command::Favorites) => {
                self.events.send(AppEvent::SwitchView(ViewKind::Favorites));
            }
            Some(Command::Film(id)) => {
                self.events.send(AppEvent::PushView(ViewKind::FilmDetail(id)));
            }
            Some(Command::Person(id)) => {
                self.events
                    .send(AppEvent::PushView(ViewKind::PersonDetail(id)));
            }
            Some(Command::Search(query)) => {
                if self.searchable_view() {
                    self.search_input = query.clone();
                    self.apply_search(&query);
                } else {
                    self.status_message =
                        Some("Search works in the film and people lists".to_string());
                }
            }
            Some(Command::Refresh) => {
                self.refresh_current();
            }
            Some(Command::Help) => {
                self.events.send(AppEvent::PushView(ViewKind::Help));
            }
            Some(Command::Quit) => {
                self.events.send(AppEvent::Quit);
            }
            None => {
                self.status_message = Some(format!("Unknown command: {input}"));
            }
        }
    }

    // -- Search -------------------------------------------------------------

    fn searchable_view(&self) -> bool {
        matches!(
            self.current_view(),
            Some(ViewKind::Films | ViewKind::People)
        )
    }

    fn start_search(&mut self) {
        let current = match self.current_view() {
            Some(ViewKind::Films) => self.films.query().to_owned(),
            Some(ViewKind::People) => self.people.query().to_owned(),
            _ => return,
        };
        self.search_input = current;
        self.mode = AppMode::Search;
    }

    /// Match count of the list being searched, shown beside the search prompt.
    pub fn search_summary(&self) -> Option<String> {
        match self.current_view() {
            Some(ViewKind::Films) => Some(self.films.result_summary("film", "films")),
            Some(ViewKind::People) => Some(self.people.result_summary("person", "people")),
            _ => None,
        }
    }

    fn apply_search(&mut self, query: &str) {
        match self.current_view().cloned() {
            Some(ViewKind::Films) => self.films.search(query),
            Some(ViewKind::People) => self.people.search(query),
            _ => return,
        }
        if let Some(vs) = self.view_stack.last_mut() {
            vs.selected_index = 0;
        }
    }

    // -- Selection helpers --------------------------------------------------

    fn move_selection_down(&mut self) {
        let count = self.current_item_count();
        if let Some(vs) = self.view_stack.last_mut()
            && vs.selected_index + 1 < count
        {
            vs.selected_index += 1;
        }
        if count > 0 && self.selected_index() + 1 >= count {
            self.load_next_page();
        }
    }

    fn move_selection_up(&mut self) {
        if let Some(vs) = self.view_stack.last_mut() {
            vs.selected_index = vs.selected_index.saturating_sub(1);
        }
    }

    fn item_count(&self, kind: &ViewKind) -> usize {
        match kind {
            ViewKind::Films => self.films.filtered_len(),
            ViewKind::People => self.people.filtered_len(),
            ViewKind::Favorites => self.favorites.favorites().len(),
            _ => 0,
        }
    }

    fn current_item_count(&self) -> usize {
        self.current_view().map_or(0, |kind| self.item_count(kind))
    }

    pub fn selected_index(&self) -> usize {
        self.view_stack.last().map_or(0, |vs| vs.selected_index)
    }

    /// Keep every selection inside its (possibly shrunk) list.
    fn clamp_selections(&mut self) {
        let counts: Vec<usize> = self
            .view_stack
            .iter()
            .map(|vs| self.item_count(&vs.kind))
            .collect();
        for (vs, count) in self.view_stack.iter_mut().zip(counts) {
            vs.selected_index = vs.selected_index.min(count.saturating_sub(1));
        }
    }

    fn selected_film(&self) -> Option<&Film> {
        let idx = self.selected_index();
        match self.current_view() {
            Some(ViewKind::Films) => self.films.get_filtered(idx),
            Some(ViewKind::Favorites) => self.favorites.favorites().get(idx),
            Some(ViewKind::FilmDetail(_)) => self.film_detail.item(),
            _ => None,
        }
    }

    fn open_selected(&mut self) {
        let target = match self.current_view() {
            Some(ViewKind::Films | ViewKind::Favorites) => self
                .selected_film()
                .and_then(Film::id)
                .map(|id| ViewKind::FilmDetail(id.to_owned())),
            Some(ViewKind::People) => self
                .people
                .get_filtered(self.selected_index())
                .and_then(Person::id)
                .map(|id| ViewKind::PersonDetail(id.to_owned())),
            _ => None,
        };
        if let Some(kind) = target {
            self.events.send(AppEvent::PushView(kind));
        }
    }

    fn load_next_page(&mut self) {
        match self.current_view().cloned() {
            Some(ViewKind::Films) => {
                if let Some(req) = self.films.load_more() {
                    self.events.send(AppEvent::FetchFilms(req));
                }
            }
            Some(ViewKind::People) => {
                if let Some(req) = self.people.load_more() {
                    self.events.send(AppEvent::FetchPeople(req));
                }
            }
            _ => {}
        }
    }

    fn refresh_current(&mut self) {
        match self.current_view().cloned() {
            Some(ViewKind::Films) => {
                if let Some(req) = self.films.refresh() {
                    self.search_input.clear();
                    self.events.send(AppEvent::FetchFilms(req));
                }
            }
            Some(ViewKind::People) => {
                if let Some(req) = self.people.refresh() {
                    self.search_input.clear();
                    self.events.send(AppEvent::FetchPeople(req));
                }
            }
            Some(ViewKind::Favorites) => {
                self.reload_favorites();
            }
            Some(ViewKind::FilmDetail(id)) => {
                if let Some(req) = self.film_detail.begin(Some(&id)) {
                    self.events.send(AppEvent::FetchFilm(req));
                }
            }
            Some(ViewKind::PersonDetail(id)) => {
                if let Some(req) = self.person_detail.begin(Some(&id)) {
                    self.events.send(AppEvent::FetchPerson(req));
                }
            }
            _ => {}
        }
    }

    // -- Favorites ----------------------------------------------------------

    fn reload_favorites(&mut self) {
        match self.favorites.load() {
            Ok(_) => self.favorites_error = None,
            Err(e) => {
                tracing::warn!("could not read favorites: {e}");
                self.favorites_error = Some(e.to_string());
            }
        }
        self.clamp_selections();
    }

    fn toggle_favorite(&mut self) {
        if !matches!(
            self.current_view(),
            Some(ViewKind::Films | ViewKind::FilmDetail(_))
        ) {
            return;
        }
        let Some(film) = self.selected_film().cloned() else {
            return;
        };

        match self.favorites.toggle(&film) {
            Ok(now_favorite) => {
                if self.film_detail.item().map(|f| f.episode_id) == Some(film.episode_id) {
                    self.film_is_favorite = now_favorite;
                }
                self.status_message = Some(if now_favorite {
                    format!("Added \"{}\" to favorites", film.title)
                } else {
                    format!("Removed \"{}\" from favorites", film.title)
                });
            }
            Err(e) => {
                tracing::warn!(episode_id = film.episode_id, "favorite toggle failed: {e}");
                self.status_message = Some(format!("Could not update favorites: {e}"));
            }
        }
    }

    fn confirm_removal(&mut self) {
        if self.current_view() != Some(&ViewKind::Favorites) {
            return;
        }
        if let Some(film) = self.selected_film().cloned() {
            self.pending_removal = Some(film);
            self.mode = AppMode::Confirm;
        }
    }

    fn remove_favorite(&mut self, film: &Film) {
        match self.favorites.remove(film.episode_id) {
            Ok(true) => {
                self.status_message = Some(format!("Removed \"{}\" from favorites", film.title));
            }
            Ok(false) => {
                self.status_message = Some(format!("\"{}\" was not a favorite", film.title));
            }
            Err(e) => {
                tracing::warn!(episode_id = film.episode_id, "favorite removal failed: {e}");
                self.status_message = Some(format!("Could not update favorites: {e}"));
            }
        }
        self.clamp_selections();
    }

    /// Membership check for the film detail screen. A failed read shows the
    /// film as not favorited.
    fn refresh_favorite_flag(&mut self) {
        let Some(episode_id) = self.film_detail.item().map(|f| f.episode_id) else {
            self.film_is_favorite = false;
            return;
        };
        self.film_is_favorite = match self.favorites.is_favorite(episode_id) {
            Ok(favorite) => favorite,
            Err(e) => {
                tracing::warn!(episode_id, "favorite lookup failed: {e}");
                false
            }
        };
    }

    // -- App event handling -------------------------------------------------

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            // Navigation
            AppEvent::Quit => {
                self.running = false;
            }
            AppEvent::PushView(kind) => {
                self.push_view(kind);
            }
            AppEvent::PopView => {
                self.pop_view();
            }
            AppEvent::SwitchView(kind) => {
                self.switch_view(kind);
            }

            // API request triggers -> dispatch to async tasks.
            ref evt @ (AppEvent::FetchFilms(_)
            | AppEvent::FetchPeople(_)
            | AppEvent::FetchFilm(_)
            | AppEvent::FetchPerson(_)) => {
                self.dispatch_api_request(evt.clone());
            }

            // API response events
            AppEvent::FilmsLoaded(response) => {
                if self.films.apply(response) {
                    self.clamp_selections();
                }
            }
            AppEvent::PeopleLoaded(response) => {
                if self.people.apply(response) {
                    self.clamp_selections();
                }
            }
            AppEvent::FilmLoaded(response) => {
                if self.film_detail.apply(response) {
                    self.refresh_favorite_flag();
                }
            }
            AppEvent::PersonLoaded(response) => {
                self.person_detail.apply(response);
            }
        }
    }

    // -- API dispatch -------------------------------------------------------

    fn dispatch_api_request(&self, event: AppEvent) {
        let client = Arc::clone(&self.api_client);
        let sender = self.events.sender();

        tokio::spawn(async move {
            let loaded = match event {
                AppEvent::FetchFilms(req) => {
                    AppEvent::FilmsLoaded(list::execute(client.as_ref(), req).await)
                }
                AppEvent::FetchPeople(req) => {
                    AppEvent::PeopleLoaded(list::execute(client.as_ref(), req).await)
                }
                AppEvent::FetchFilm(req) => {
                    let url = client.film_url(&req.id);
                    AppEvent::FilmLoaded(detail::execute(client.as_ref(), &req, &url).await)
                }
                AppEvent::FetchPerson(req) => {
                    let url = client.person_url(&req.id);
                    AppEvent::PersonLoaded(detail::execute(client.as_ref(), &req, &url).await)
                }
                // Not an API request event -- ignore.
                _ => return,
            };
            let _ = sender.send(Event::App(Box::new(loaded)));
        });
    }

    // -- Helpers ------------------------------------------------------------

    /// Whether the current view is waiting on the network.
    pub fn is_loading(&self) -> bool {
        match self.current_view() {
            Some(ViewKind::Films) => {
                self.films.is_loading()
                    || self.films.is_loading_more()
                    || self.films.is_refreshing()
            }
            Some(ViewKind::People) => {
                self.people.is_loading()
                    || self.people.is_loading_more()
                    || self.people.is_refreshing()
            }
            Some(ViewKind::FilmDetail(_)) => self.film_detail.is_loading(),
            Some(ViewKind::PersonDetail(_)) => self.person_detail.is_loading(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
