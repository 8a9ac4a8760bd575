pub mod accounts;
pub mod catalog;
pub mod library;
pub mod maintenance;
pub mod recommendations;
pub mod search;

pub use accounts::AccountService;
pub use catalog::{CatalogClient, TvMazeClient};
pub use library::LibraryService;
pub use recommendations::RecommendationService;
pub use search::ShowSearchService;
