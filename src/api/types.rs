use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Paginated collection wrapper
// ---------------------------------------------------------------------------

/// One page of a collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub count: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Wire shape of a collection response.
///
/// Most deployments answer with the `{ results, next, previous, count }`
/// envelope; swapi.info returns a bare array for some collections, which is
/// read as a single final page. An object without `results` is rejected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PageBody<T> {
    Bare(Vec<T>),
    Envelope {
        results: Vec<T>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl<T> From<PageBody<T>> for Page<T> {
    fn from(body: PageBody<T>) -> Self {
        match body {
            PageBody::Envelope {
                results,
                next,
                previous,
                count,
            } => {
                let count = count.unwrap_or(results.len() as u64);
                Page {
                    results,
                    next: next.filter(|n| !n.is_empty()),
                    previous: previous.filter(|p| !p.is_empty()),
                    count,
                }
            }
            PageBody::Bare(results) => Page {
                count: results.len() as u64,
                results,
                next: None,
                previous: None,
            },
        }
    }
}

/// Last non-empty path segment of a resource URL, used as its routable id.
pub fn resource_id(url: &str) -> Option<&str> {
    url.split('/').rfind(|segment| !segment.is_empty())
}

// ---------------------------------------------------------------------------
// Film
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub episode_id: u32,
    pub title: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub opening_crawl: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub planets: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub edited: Option<String>,
}

impl Film {
    pub fn id(&self) -> Option<&str> {
        resource_id(&self.url)
    }
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub mass: String,
    #[serde(default)]
    pub hair_color: String,
    #[serde(default)]
    pub eye_color: String,
    #[serde(default)]
    pub skin_color: String,
    #[serde(default)]
    pub homeworld: Option<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edited: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    NotApplicable,
    Other,
}

impl Person {
    pub fn id(&self) -> Option<&str> {
        resource_id(&self.url)
    }

    pub fn gender_kind(&self) -> Gender {
        match self.gender.as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            "n/a" => Gender::NotApplicable,
            _ => Gender::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_enveloped_page() {
        let body: PageBody<Person> = serde_json::from_value(json!({
            "count": 82,
            "next": "https://swapi.dev/api/people/?page=2",
            "previous": null,
            "results": [{ "name": "Luke Skywalker", "gender": "male" }]
        }))
        .unwrap();
        let page = Page::from(body);
        assert_eq!(page.count, 82);
        assert_eq!(page.results.len(), 1);
        assert_eq!(
            page.next.as_deref(),
            Some("https://swapi.dev/api/people/?page=2")
        );
        assert!(page.has_next());
    }

    #[test]
    fn reads_bare_array_as_final_page() {
        let body: PageBody<Film> = serde_json::from_value(json!([
            { "episode_id": 4, "title": "A New Hope" },
            { "episode_id": 5, "title": "The Empire Strikes Back" }
        ]))
        .unwrap();
        let page = Page::from(body);
        assert_eq!(page.count, 2);
        assert!(!page.has_next());
        assert_eq!(page.results[1].episode_id, 5);
    }

    #[test]
    fn empty_next_is_end_of_collection() {
        let body: PageBody<Film> =
            serde_json::from_value(json!({ "results": [], "next": "" })).unwrap();
        assert!(!Page::from(body).has_next());
    }

    #[test]
    fn object_without_results_is_rejected() {
        let body = serde_json::from_value::<PageBody<Film>>(json!({ "detail": "Not found" }));
        assert!(body.is_err());
    }

    #[test]
    fn resource_id_takes_last_segment() {
        assert_eq!(resource_id("https://swapi.info/api/films/1/"), Some("1"));
        assert_eq!(resource_id("https://swapi.info/api/people/42"), Some("42"));
        assert_eq!(resource_id(""), None);
    }

    #[test]
    fn person_timestamps_and_gender() {
        let person: Person = serde_json::from_value(json!({
            "name": "R2-D2",
            "gender": "n/a",
            "created": "2014-12-10T15:11:50.376000Z",
            "url": "https://swapi.info/api/people/3"
        }))
        .unwrap();
        assert_eq!(person.gender_kind(), Gender::NotApplicable);
        assert!(person.created.is_some());
        assert_eq!(person.id(), Some("3"));
    }
}
