//! Favorite films, kept consistent with the persisted set.
//!
//! Every mutation is a whole-set read-modify-write through the repository.
//! The in-memory mirror is only updated after the write succeeds, so a
//! failed write leaves both the store and the mirror as they were.

use crate::api::types::Film;
use crate::format::pluralize;
use crate::storage::{FavoritesRepository, StorageError};

pub struct FavoritesController<R> {
    repo: R,
    favorites: Vec<Film>,
}

impl<R: FavoritesRepository> FavoritesController<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            favorites: Vec::new(),
        }
    }

    /// Re-read the persisted set into the mirror.
    pub fn load(&mut self) -> Result<&[Film], StorageError> {
        self.favorites = self.repo.get()?;
        Ok(&self.favorites)
    }

    /// The last successfully read or written set.
    pub fn favorites(&self) -> &[Film] {
        &self.favorites
    }

    pub fn is_favorite(&self, episode_id: u32) -> Result<bool, StorageError> {
        Ok(self
            .repo
            .get()?
            .iter()
            .any(|film| film.episode_id == episode_id))
    }

    /// Add `film` if absent, remove it if present. Returns the new membership.
    pub fn toggle(&mut self, film: &Film) -> Result<bool, StorageError> {
        let mut set = self.repo.get()?;
        let now_favorite = match set.iter().position(|f| f.episode_id == film.episode_id) {
            Some(index) => {
                set.remove(index);
                false
            }
            None => {
                set.push(film.clone());
                true
            }
        };
        self.repo.set(&set)?;
        tracing::debug!(episode_id = film.episode_id, now_favorite, "favorite toggled");
        self.favorites = set;
        Ok(now_favorite)
    }

    /// Remove the film with `episode_id`. Returns whether anything was removed.
    pub fn remove(&mut self, episode_id: u32) -> Result<bool, StorageError> {
        let mut set = self.repo.get()?;
        let before = set.len();
        set.retain(|film| film.episode_id != episode_id);
        let removed = set.len() != before;
        if removed {
            self.repo.set(&set)?;
            tracing::debug!(episode_id, "favorite removed");
        }
        self.favorites = set;
        Ok(removed)
    }

    /// "1 film" / "3 films".
    pub fn count_label(&self) -> String {
        pluralize(self.favorites.len(), "film", "films")
    }
}
