pub mod detail;
pub mod favorites;
pub mod list;

pub use detail::{DetailState, EntityRequest, EntityResponse};
pub use favorites::FavoritesController;
pub use list::{ListState, LoadKind, PageRequest, PageResponse, Searchable};
