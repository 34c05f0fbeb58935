//! mod.io client library
//!
//! Async client for the mod.io REST API: games, mods, files, comments,
//! ratings, events and the authenticated user's own resources.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use modio::{Client, Filter, SortDirection};
//!
//! # async fn example() -> modio::Result<()> {
//! let client = Client::new("your-api-key")?;
//!
//! let filter = Filter::games()
//!     .like("name", "*knight*")?
//!     .sort("date_live", SortDirection::Descending)?
//!     .limit(10)?;
//!
//! let games = client.get_games(Some(filter)).await?;
//! for game in &games {
//!     println!("{} ({})", game.name, game.id);
//! }
//!
//! // Entities call back into the client that fetched them
//! if let Some(game) = games.iter().next() {
//!     let mods = game.get_mods(None).await?;
//!     println!("{} has {} mods", game.name, mods.pagination.total);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed entities**: every response is mapped onto a struct, unknown enum values are kept
//! - **Checked filters**: field names and value kinds are validated before sending
//! - **Rate limiting**: the client waits out `x-ratelimit-retryafter` before the next call
//! - **Typed errors**: one variant per HTTP status with the server's field errors attached
//! - **OAuth email flow**: exchange an emailed code for an access token

pub mod api;
pub mod core;
pub mod filter;
pub mod objects;

// Re-export commonly used types for convenience
pub use api::{Client, ClientBuilder, RateLimitStatus};
pub use crate::core::{ApiError, ClientConfig, Credentials, ModioError, Result, ValidationError};
pub use filter::{Filter, FilterValue, Operator, SortDirection};
pub use objects::{Game, Mod, ModFile, Pagination, Returned, User};
