use crate::api::types::Film;
use crate::api::{ApiClientError, EntityFetcher, Resource, SwapiClient};

impl SwapiClient {
    /// First page of the film collection.
    pub fn films_url(&self) -> String {
        self.collection_url(Resource::Films)
    }

    pub fn film_url(&self, id: &str) -> String {
        self.entity_url(Resource::Films, id)
    }

    /// Fetch a single film by its routable id.
    pub async fn get_film(&self, id: &str) -> Result<Film, ApiClientError> {
        self.fetch_entity(&self.film_url(id)).await
    }
}
