use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, eyre};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::SwapiClient;
use crate::api::types::{Film, Person};
use crate::command::parse_resource_id;
use crate::config::{AppConfig, load_config};
use crate::state::{FavoritesController, ListState, Searchable, list};
use crate::storage::JsonFileStore;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "holocron", about = "TUI and CLI for the Star Wars API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Launch the interactive TUI (default)
    Tui,
    /// List films (JSONL)
    Films {
        /// Only films whose title, director or producer contain this text
        #[arg(long, short)]
        search: Option<String>,
    },
    /// List people (JSONL)
    People {
        /// Only people whose name, gender or birth year contain this text
        #[arg(long, short)]
        search: Option<String>,
        /// Follow `next` links until the collection is exhausted
        #[arg(long)]
        all: bool,
    },
    /// Fetch a single film (JSONL)
    Film {
        /// Film id or URL
        id_or_url: String,
    },
    /// Fetch a single person (JSONL)
    Person {
        /// Person id or URL
        id_or_url: String,
    },
    /// List favorite films (JSONL)
    Favorites,
    /// Toggle a film in the favorites
    Favorite {
        /// Film id or URL
        id_or_url: String,
    },
    /// Remove a film from the favorites by episode number
    Unfavorite {
        /// Episode number of the film
        episode_id: u32,
    },
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Print items as JSONL to stdout.
fn print_jsonl<T: Serialize>(items: &[T]) -> eyre::Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Client construction (shared with main.rs TUI path)
// ---------------------------------------------------------------------------

pub fn build_api_client(config: &AppConfig) -> eyre::Result<SwapiClient> {
    SwapiClient::new(&config.base_url, config.request_timeout()).map_err(|e| eyre!("{e}"))
}

pub fn build_favorites(config: &AppConfig) -> FavoritesController<JsonFileStore> {
    let store = JsonFileStore::new(config.data_dir());
    tracing::debug!(dir = %store.dir().display(), "favorites store");
    FavoritesController::new(store)
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

/// Drive a list controller to completion: first page, then every `next` page
/// if `all` is set.
async fn collect_list<T>(
    client: &SwapiClient,
    base_url: &str,
    all: bool,
    search: Option<&str>,
) -> eyre::Result<ListState<T>>
where
    T: Searchable + DeserializeOwned + Send,
{
    let mut state = ListState::<T>::new();
    let mut request = state.initialize(base_url);

    while let Some(req) = request {
        let response = list::execute(client, req).await;
        state.apply(response);
        if let Some(err) = state.error() {
            if state.items().is_empty() {
                return Err(eyre!("{err}"));
            }
            tracing::warn!("stopping pagination early: {err}");
            break;
        }
        request = if all { state.load_more() } else { None };
    }

    if let Some(query) = search {
        state.search(query);
    }
    Ok(state)
}

fn resource_id(id_or_url: &str, collection: &str) -> eyre::Result<String> {
    parse_resource_id(id_or_url, collection)
        .ok_or_else(|| eyre!("not a {collection} id or URL: {id_or_url}"))
}

pub async fn run_command(cmd: CliCommand) -> eyre::Result<()> {
    let config = load_config();
    let client = build_api_client(&config)?;

    match cmd {
        CliCommand::Tui => unreachable!("tui is handled in main"),

        CliCommand::Films { search } => {
            let films =
                collect_list::<Film>(&client, &client.films_url(), true, search.as_deref()).await?;
            print_jsonl(&films.filtered())?;
        }

        CliCommand::People { search, all } => {
            let people = collect_list::<Person>(
                &client,
                &client.people_url(),
                all,
                search.as_deref(),
            )
            .await?;
            print_jsonl(&people.filtered())?;
            if people.has_more() {
                eprintln!("More results available; pass --all to fetch every page.");
            }
        }

        CliCommand::Film { id_or_url } => {
            let id = resource_id(&id_or_url, "films")?;
            let film = client.get_film(&id).await.map_err(|e| eyre!("{e}"))?;
            print_jsonl(&[film])?;
        }

        CliCommand::Person { id_or_url } => {
            let id = resource_id(&id_or_url, "people")?;
            let person = client.get_person(&id).await.map_err(|e| eyre!("{e}"))?;
            print_jsonl(&[person])?;
        }

        CliCommand::Favorites => {
            let mut favorites = build_favorites(&config);
            print_jsonl(favorites.load()?)?;
        }

        CliCommand::Favorite { id_or_url } => {
            let id = resource_id(&id_or_url, "films")?;
            let film = client.get_film(&id).await.map_err(|e| eyre!("{e}"))?;
            let mut favorites = build_favorites(&config);
            let favorite = favorites.toggle(&film)?;
            let line = serde_json::json!({
                "episode_id": film.episode_id,
                "title": film.title,
                "favorite": favorite,
            });
            println!("{line}");
        }

        CliCommand::Unfavorite { episode_id } => {
            let mut favorites = build_favorites(&config);
            if !favorites.remove(episode_id)? {
                return Err(eyre!("episode {episode_id} is not a favorite"));
            }
            let line = serde_json::json!({ "episode_id": episode_id, "favorite": false });
            println!("{line}");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
