pub mod favorites;
pub mod history;
pub mod show_cache;
pub mod subscription;
pub mod users;

mod sqlite;

pub use favorites::{FavoriteStore, SqliteFavoriteStore};
pub use history::{SearchHistoryStore, SqliteHistoryStore};
pub use show_cache::{ShowCacheStore, SqliteShowCache};
pub use sqlite::{create_memory_pool, create_pool};
pub use subscription::{ChangeFeed, LiveQuery};
pub use users::{SqliteUserStore, UserStore};
