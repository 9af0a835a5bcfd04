//! Paginated, searchable list state.
//!
//! `ListState` never performs IO itself. Every operation that needs the
//! network returns a [`PageRequest`]; the caller runs it (see [`execute`]) and
//! feeds the [`PageResponse`] back through [`ListState::apply`]. Each request
//! carries a generation number and only the most recently issued generation is
//! ever applied, so a slow response can never overwrite newer state.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::api::EntityFetcher;
use crate::api::types::{Film, Page, Person};
use crate::event::ApiResult;
use crate::format::pluralize;

/// Entities that can be matched by the client-side search filter.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match against any search field.
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Searchable for Person {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.gender.as_str(),
            self.birth_year.as_str(),
        ]
    }
}

impl Searchable for Film {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.director.as_str(),
            self.producer.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// First page after a reset; failure leaves an empty list.
    Initial,
    /// First page again, keeping current data visible until it lands.
    Refresh,
    /// Next page, appended to the current data.
    More,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub kind: LoadKind,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PageResponse<T> {
    pub generation: u64,
    pub kind: LoadKind,
    pub result: ApiResult<Page<T>>,
}

impl<T> PageResponse<T> {
    pub fn for_request(request: &PageRequest, result: ApiResult<Page<T>>) -> Self {
        Self {
            generation: request.generation,
            kind: request.kind,
            result,
        }
    }
}

/// Run a page request through a fetcher. Errors end up inside the response.
pub async fn execute<F, T>(fetcher: &F, request: PageRequest) -> PageResponse<T>
where
    F: EntityFetcher + Sync,
    T: DeserializeOwned + Send,
{
    let result = fetcher.fetch_page::<T>(&request.url).await.map_err(|e| {
        tracing::warn!(url = %request.url, "page fetch failed: {e}");
        Arc::new(e.to_string())
    });
    PageResponse::for_request(&request, result)
}

#[derive(Debug)]
pub struct ListState<T> {
    base_url: Option<String>,
    items: Vec<T>,
    /// Indices into `items` that match `query`, in `items` order.
    visible: Vec<usize>,
    query: String,
    next_url: Option<String>,
    has_more: bool,
    total: Option<u64>,
    loading: bool,
    loading_more: bool,
    refreshing: bool,
    error: Option<String>,
    generation: u64,
    active: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            base_url: None,
            items: Vec::new(),
            visible: Vec::new(),
            query: String::new(),
            next_url: None,
            has_more: false,
            total: None,
            loading: false,
            loading_more: false,
            refreshing: false,
            error: None,
            generation: 0,
            active: false,
        }
    }
}

impl<T: Searchable> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Start the list if it is not already running. Calling this again before
    /// [`dispose`](Self::dispose) issues nothing.
    pub fn initialize(&mut self, base_url: &str) -> Option<PageRequest> {
        if self.active {
            return None;
        }
        self.active = true;
        Some(self.load_initial(base_url))
    }

    /// Drop all data and invalidate anything still in flight.
    pub fn dispose(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            base_url: self.base_url.take(),
            generation,
            ..Self::default()
        };
    }

    // -- Operations ---------------------------------------------------------

    /// Reset and request the first page of `base_url`.
    pub fn load_initial(&mut self, base_url: &str) -> PageRequest {
        self.base_url = Some(base_url.to_owned());
        self.active = true;
        self.items.clear();
        self.visible.clear();
        self.query.clear();
        self.next_url = None;
        self.has_more = false;
        self.total = None;
        self.error = None;
        self.loading = true;
        self.loading_more = false;
        self.refreshing = false;
        self.issue(LoadKind::Initial, base_url.to_owned())
    }

    /// Request the next page, unless there is none or something is in flight.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.has_more || self.is_busy() {
            return None;
        }
        let url = self.next_url.clone()?;
        self.loading_more = true;
        Some(self.issue(LoadKind::More, url))
    }

    /// Re-request the first page of the original base URL. Clears the search.
    /// Refused while a previous refresh is still pending.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        if self.refreshing {
            return None;
        }
        let url = self.base_url.clone()?;
        self.active = true;
        self.query.clear();
        self.recompute_visible();
        self.error = None;
        self.loading = false;
        self.loading_more = false;
        self.refreshing = true;
        Some(self.issue(LoadKind::Refresh, url))
    }

    /// Filter the full list by `query`. Never touches the network.
    pub fn search(&mut self, query: &str) {
        self.query = query.to_owned();
        self.recompute_visible();
    }

    /// Reconcile a finished request. Returns `false` if it was stale.
    pub fn apply(&mut self, response: PageResponse<T>) -> bool {
        if response.generation != self.generation {
            tracing::debug!(
                got = response.generation,
                latest = self.generation,
                "discarding stale page response"
            );
            return false;
        }

        match response.kind {
            LoadKind::Initial => self.loading = false,
            LoadKind::Refresh => self.refreshing = false,
            LoadKind::More => self.loading_more = false,
        }

        match response.result {
            Ok(page) => {
                self.error = None;
                self.has_more = page.has_next();
                self.next_url = page.next;
                self.total = Some(page.count);
                match response.kind {
                    LoadKind::Initial | LoadKind::Refresh => self.items = page.results,
                    LoadKind::More => self.items.extend(page.results),
                }
                self.recompute_visible();
            }
            Err(e) => {
                if response.kind == LoadKind::Initial {
                    self.items.clear();
                    self.visible.clear();
                    self.has_more = false;
                    self.next_url = None;
                }
                self.error = Some(e.to_string());
            }
        }
        true
    }

    // -- Accessors ----------------------------------------------------------

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filtered(&self) -> Vec<&T> {
        self.visible.iter().map(|&i| &self.items[i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn get_filtered(&self, index: usize) -> Option<&T> {
        self.visible.get(index).and_then(|&i| self.items.get(i))
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// "12 people", or `3 people found for "sky"` while a search is active.
    pub fn result_summary(&self, singular: &str, plural: &str) -> String {
        let shown = pluralize(self.visible.len(), singular, plural);
        if self.query.trim().is_empty() {
            shown
        } else {
            format!("{shown} found for \"{}\"", self.query)
        }
    }

    // -- Internals ----------------------------------------------------------

    fn is_busy(&self) -> bool {
        self.loading || self.loading_more || self.refreshing
    }

    fn issue(&mut self, kind: LoadKind, url: String) -> PageRequest {
        self.generation += 1;
        tracing::debug!(generation = self.generation, ?kind, %url, "issuing page request");
        PageRequest {
            generation: self.generation,
            kind,
            url,
        }
    }

    fn recompute_visible(&mut self) {
        if self.query.trim().is_empty() {
            self.visible = (0..self.items.len()).collect();
            return;
        }
        let needle = self.query.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(&needle))
            .map(|(i, _)| i)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;

    use serde_json::{Value, json};

    use super::*;
    use crate::api::ApiClientError;
    use crate::api::types::PageBody;

    /// Serves canned JSON bodies by URL; unknown URLs answer 404.
    #[derive(Default)]
    struct CannedFetcher {
        pages: HashMap<String, Value>,
    }

    impl CannedFetcher {
        fn with(mut self, url: &str, body: Value) -> Self {
            self.pages.insert(url.to_owned(), body);
            self
        }
    }

    impl EntityFetcher for CannedFetcher {
        fn fetch_page<T>(
            &self,
            url: &str,
        ) -> impl Future<Output = Result<Page<T>, ApiClientError>> + Send
        where
            T: DeserializeOwned + Send,
        {
            let body = self.pages.get(url).cloned();
            async move {
                let body = body.ok_or_else(|| ApiClientError::ApiError {
                    status: 404,
                    detail: "Not found".into(),
                })?;
                let page: PageBody<T> = serde_json::from_value(body)
                    .map_err(|e| ApiClientError::Deserialize(e.to_string()))?;
                Ok(page.into())
            }
        }

        fn fetch_entity<T>(&self, url: &str) -> impl Future<Output = Result<T, ApiClientError>> + Send
        where
            T: DeserializeOwned + Send,
        {
            let body = self.pages.get(url).cloned();
            async move {
                let body = body.ok_or_else(|| ApiClientError::ApiError {
                    status: 404,
                    detail: "Not found".into(),
                })?;
                serde_json::from_value(body).map_err(|e| ApiClientError::Deserialize(e.to_string()))
            }
        }
    }

    fn person(name: &str, gender: &str, birth_year: &str) -> Person {
        serde_json::from_value(json!({
            "name": name,
            "gender": gender,
            "birth_year": birth_year,
        }))
        .unwrap()
    }

    fn page<T>(results: Vec<T>, next: Option<&str>) -> ApiResult<Page<T>> {
        Ok(Page {
            count: results.len() as u64,
            results,
            next: next.map(str::to_owned),
            previous: None,
        })
    }

    fn loaded(people: Vec<Person>) -> ListState<Person> {
        let mut list = ListState::new();
        let req = list.load_initial("/people/");
        assert!(list.apply(PageResponse::for_request(&req, page(people, None))));
        list
    }

    fn names(list: &ListState<Person>) -> Vec<&str> {
        list.filtered().iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn two_pages_accumulate_in_order() {
        let fetcher = CannedFetcher::default()
            .with(
                "/films/",
                json!({
                    "count": 3,
                    "next": "/films/?page=2",
                    "results": [
                        { "episode_id": 1, "title": "The Phantom Menace" },
                        { "episode_id": 2, "title": "Attack of the Clones" }
                    ]
                }),
            )
            .with(
                "/films/?page=2",
                json!({
                    "count": 3,
                    "next": null,
                    "results": [{ "episode_id": 3, "title": "Revenge of the Sith" }]
                }),
            );

        let mut films = ListState::<Film>::new();
        let req = films.initialize("/films/").unwrap();
        assert!(films.is_loading());
        films.apply(execute(&fetcher, req).await);
        assert!(!films.is_loading());
        assert!(films.has_more());

        let req = films.load_more().unwrap();
        films.apply(execute(&fetcher, req).await);

        let ids: Vec<u32> = films.items().iter().map(|f| f.episode_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!films.has_more());
        assert_eq!(films.filtered_len(), 3);
        assert!(films.load_more().is_none());
    }

    #[tokio::test]
    async fn initial_failure_leaves_empty_list_with_error() {
        let fetcher = CannedFetcher::default();
        let mut people = ListState::<Person>::new();
        let req = people.load_initial("/missing/");
        people.apply(execute(&fetcher, req).await);

        assert!(people.items().is_empty());
        assert!(!people.is_loading());
        assert!(people.error().unwrap().contains("404"));
    }

    #[test]
    fn load_more_is_single_flight() {
        let mut list = ListState::<Person>::new();
        let req = list.load_initial("/people/");
        list.apply(PageResponse::for_request(
            &req,
            page(vec![person("Luke Skywalker", "male", "19BBY")], Some("/people/?page=2")),
        ));

        let first = list.load_more();
        assert!(first.is_some());
        assert!(list.is_loading_more());
        assert!(list.load_more().is_none());
    }

    #[test]
    fn load_more_waits_for_initial_load() {
        let mut list = ListState::<Person>::new();
        let _pending = list.load_initial("/people/");
        assert!(list.load_more().is_none());
    }

    #[test]
    fn more_failure_keeps_loaded_data() {
        let mut list = ListState::<Person>::new();
        let req = list.load_initial("/people/");
        list.apply(PageResponse::for_request(
            &req,
            page(vec![person("Leia Organa", "female", "19BBY")], Some("/people/?page=2")),
        ));
        let req = list.load_more().unwrap();
        list.apply(PageResponse::for_request(&req, Err(Arc::new("timeout".into()))));

        assert_eq!(names(&list), vec!["Leia Organa"]);
        assert_eq!(list.error(), Some("timeout"));
        assert!(!list.is_loading_more());
        // The cursor survives, so the user can retry.
        assert!(list.load_more().is_some());
    }

    #[test]
    fn search_filters_name_gender_and_birth_year() {
        let mut list = loaded(vec![
            person("Luke Skywalker", "male", "19BBY"),
            person("Leia Organa", "female", "19BBY"),
            person("R2-D2", "n/a", "33BBY"),
            person("Anakin Skywalker", "male", "41.9BBY"),
        ]);

        list.search("SKY");
        assert_eq!(names(&list), vec!["Luke Skywalker", "Anakin Skywalker"]);

        list.search("female");
        assert_eq!(names(&list), vec!["Leia Organa"]);

        list.search("33b");
        assert_eq!(names(&list), vec!["R2-D2"]);

        list.search("   ");
        assert_eq!(list.filtered_len(), 4);
        assert_eq!(list.items().len(), 4);
    }

    #[test]
    fn filtered_view_is_ordered_subset_matching_query() {
        let mut list = loaded(vec![
            person("Obi-Wan Kenobi", "male", "57BBY"),
            person("Beru Whitesun lars", "female", "47BBY"),
            person("Owen Lars", "male", "52BBY"),
            person("Biggs Darklighter", "male", "24BBY"),
        ]);

        for query in ["lars", "a", "BBY", "male", "zzz"] {
            list.search(query);
            let needle = query.to_lowercase();
            let mut last_position = None;
            for p in list.filtered() {
                assert!(p.matches(&needle), "{} does not match {query}", p.name);
                let position = list.items().iter().position(|i| std::ptr::eq(i, p));
                assert!(position > last_position);
                last_position = position;
            }
        }
    }

    #[test]
    fn appended_pages_respect_active_query() {
        let mut list = ListState::<Person>::new();
        let req = list.load_initial("/people/");
        list.apply(PageResponse::for_request(
            &req,
            page(vec![person("Luke Skywalker", "male", "19BBY")], Some("/people/?page=2")),
        ));
        list.search("sky");
        let req = list.load_more().unwrap();
        list.apply(PageResponse::for_request(
            &req,
            page(
                vec![
                    person("Darth Vader", "male", "41.9BBY"),
                    person("Shmi Skywalker", "female", "72BBY"),
                ],
                None,
            ),
        ));

        assert_eq!(list.items().len(), 3);
        assert_eq!(names(&list), vec!["Luke Skywalker", "Shmi Skywalker"]);
    }

    #[test]
    fn refresh_clears_search_and_uses_its_own_flag() {
        let mut list = loaded(vec![
            person("Luke Skywalker", "male", "19BBY"),
            person("Leia Organa", "female", "19BBY"),
        ]);
        list.search("leia");

        let req = list.refresh().unwrap();
        assert_eq!(req.url, "/people/");
        assert_eq!(req.kind, LoadKind::Refresh);
        assert!(list.is_refreshing());
        assert!(!list.is_loading());
        assert_eq!(list.query(), "");
        // Old data stays visible while refreshing.
        assert_eq!(list.filtered_len(), 2);

        list.apply(PageResponse::for_request(
            &req,
            page(vec![person("Han Solo", "male", "29BBY")], None),
        ));
        assert!(!list.is_refreshing());
        assert_eq!(names(&list), vec!["Han Solo"]);
    }

    #[test]
    fn refresh_failure_keeps_data() {
        let mut list = loaded(vec![person("Chewbacca", "male", "200BBY")]);
        let req = list.refresh().unwrap();
        list.apply(PageResponse::for_request(&req, Err(Arc::new("offline".into()))));
        assert_eq!(names(&list), vec!["Chewbacca"]);
        assert_eq!(list.error(), Some("offline"));
    }

    #[test]
    fn refresh_is_single_flight() {
        let mut list = loaded(vec![person("Obi-Wan Kenobi", "male", "57BBY")]);
        let first = list.refresh().unwrap();
        assert!(list.refresh().is_none());

        list.apply(PageResponse::for_request(
            &first,
            page(vec![person("Yoda", "male", "896BBY")], None),
        ));
        assert_eq!(names(&list), vec!["Yoda"]);
        assert!(list.refresh().is_some());
    }

    #[tokio::test]
    async fn page_without_results_surfaces_error() {
        let fetcher = CannedFetcher::default().with("/films/", json!({ "detail": "Not found" }));
        let mut films = ListState::<Film>::new();
        let req = films.load_initial("/films/");
        films.apply(execute(&fetcher, req).await);

        assert!(films.items().is_empty());
        assert!(!films.has_more());
        assert!(films.error().is_some());
    }

    #[test]
    fn refresh_without_base_url_is_refused() {
        let mut list = ListState::<Person>::new();
        assert!(list.refresh().is_none());
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut list = ListState::<Person>::new();
        let old = list.load_initial("/people/");
        let new = list.refresh().unwrap();

        assert!(!list.apply(PageResponse::for_request(
            &old,
            page(vec![person("Greedo", "male", "44BBY")], None),
        )));
        assert!(list.items().is_empty());

        assert!(list.apply(PageResponse::for_request(
            &new,
            page(vec![person("Jabba Desilijic Tiure", "hermaphrodite", "600BBY")], None),
        )));
        assert_eq!(names(&list), vec!["Jabba Desilijic Tiure"]);
    }

    #[test]
    fn initialize_is_idempotent_until_disposed() {
        let mut list = ListState::<Person>::new();
        let first = list.initialize("/people/").unwrap();
        assert!(list.initialize("/people/").is_none());

        list.dispose();
        assert!(!list.is_active());
        assert!(!list.apply(PageResponse::for_request(
            &first,
            page(vec![person("Wedge Antilles", "male", "21BBY")], None),
        )));
        assert!(list.items().is_empty());

        let second = list.initialize("/people/").unwrap();
        assert!(second.generation > first.generation);
    }

    #[test]
    fn result_summary_mentions_query() {
        let mut list = loaded(vec![
            person("Luke Skywalker", "male", "19BBY"),
            person("Yoda", "male", "896BBY"),
        ]);
        assert_eq!(list.result_summary("person", "people"), "2 people");
        list.search("yoda");
        assert_eq!(
            list.result_summary("person", "people"),
            "1 person found for \"yoda\""
        );
    }
}
