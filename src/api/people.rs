use crate::api::types::Person;
use crate::api::{ApiClientError, EntityFetcher, Resource, SwapiClient};

impl SwapiClient {
    /// First page of the people collection.
    pub fn people_url(&self) -> String {
        self.collection_url(Resource::People)
    }

    pub fn person_url(&self, id: &str) -> String {
        self.entity_url(Resource::People, id)
    }

    /// Fetch a single person by their routable id.
    pub async fn get_person(&self, id: &str) -> Result<Person, ApiClientError> {
        self.fetch_entity(&self.person_url(id)).await
    }
}
