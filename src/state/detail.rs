use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::api::EntityFetcher;
use crate::event::ApiResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRequest {
    pub generation: u64,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct EntityResponse<T> {
    pub generation: u64,
    pub result: ApiResult<T>,
}

/// Run an entity request against `url`. Errors end up inside the response.
pub async fn execute<F, T>(fetcher: &F, request: &EntityRequest, url: &str) -> EntityResponse<T>
where
    F: EntityFetcher + Sync,
    T: DeserializeOwned + Send,
{
    let result = fetcher.fetch_entity::<T>(url).await.map_err(|e| {
        tracing::warn!(%url, "entity fetch failed: {e}");
        Arc::new(e.to_string())
    });
    EntityResponse {
        generation: request.generation,
        result,
    }
}

/// State of a single-entity detail screen.
#[derive(Debug)]
pub struct DetailState<T> {
    id: Option<String>,
    item: Option<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for DetailState<T> {
    fn default() -> Self {
        Self {
            id: None,
            item: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl<T> DetailState<T> {
    /// Start loading `id`. Without an id there is nothing to fetch.
    pub fn begin(&mut self, id: Option<&str>) -> Option<EntityRequest> {
        let id = id.filter(|id| !id.is_empty())?;
        self.generation += 1;
        self.id = Some(id.to_owned());
        self.item = None;
        self.error = None;
        self.loading = true;
        Some(EntityRequest {
            generation: self.generation,
            id: id.to_owned(),
        })
    }

    /// Store a finished fetch. Returns `false` if a newer request superseded it.
    pub fn apply(&mut self, response: EntityResponse<T>) -> bool {
        if response.generation != self.generation {
            tracing::debug!(
                got = response.generation,
                latest = self.generation,
                "discarding stale entity response"
            );
            return false;
        }
        self.loading = false;
        match response.result {
            Ok(item) => self.item = Some(item),
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    /// Forget the current entity and ignore anything still in flight.
    pub fn clear(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
