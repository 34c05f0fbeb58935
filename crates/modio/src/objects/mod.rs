//! Typed entities and the mapping from response JSON to them
//!
//! Mapping is plain serde: each entity is a struct with explicit fields,
//! unknown keys are ignored and the API's coercions (0 timestamps, 0/1
//! booleans, empty objects) live in [`de`]. After deserializing, the
//! dispatcher attaches a [`ClientHandle`] so entities can issue follow-up
//! calls such as [`Mod::get_files`].

/// `Debug` for entities that hold a [`ClientHandle`], listing only data fields
macro_rules! entity_debug {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    $(.field(stringify!($field), &self.$field))+
                    .finish_non_exhaustive()
            }
        }
    };
}

mod comment;
mod common;
pub(crate) mod de;
mod enums;
mod event;
mod file;
mod game;
mod mods;
mod pagination;
mod rating;
mod user;

pub use crate::api::dispatcher::ClientHandle;
pub use comment::Comment;
pub use common::{
    AccessToken, Image, Message, MetadataKvp, ModMedia, Platform, Tag, TagOption, Thumbnail,
};
pub use de::Timestamp;
pub use enums::*;
pub use event::Event;
pub use file::{Download, EditModFile, FileHash, ModFile};
pub use game::{Game, GameStats};
pub use mods::{Dependency, EditMod, Mod, ModStats};
pub use pagination::{Pagination, Returned};
pub use rating::Rating;
pub use user::{TeamMember, User};

use serde::de::{DeserializeOwned, Error as _};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{ModioError, Result};

/// A type the API returns
pub trait Entity: DeserializeOwned {
    /// Name used in error messages
    const NAME: &'static str;

    /// Give the entity (and anything nested in it) access to the client
    fn attach(&mut self, _handle: &ClientHandle) {}
}

fn malformed(entity: &'static str, reason: &str) -> ModioError {
    ModioError::MalformedResponse {
        entity,
        source: serde_json::Error::custom(reason),
    }
}

/// Map a single JSON object to `T`
pub fn map_entity<T: Entity>(value: Value, handle: &ClientHandle) -> Result<T> {
    let mut entity: T =
        serde_json::from_value(value).map_err(|source| ModioError::MalformedResponse {
            entity: T::NAME,
            source,
        })?;
    entity.attach(handle);
    Ok(entity)
}

/// Map a list response (`data` plus pagination) to a page of `T`
pub fn map_collection<T: Entity>(value: Value, handle: &ClientHandle) -> Result<Returned<T>> {
    let Value::Object(mut object) = value else {
        return Err(malformed(T::NAME, "expected a JSON object for a list response"));
    };

    let items = match object.remove("data").or_else(|| object.remove("results")) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(malformed(T::NAME, "`data` is not an array")),
        None => return Err(malformed(T::NAME, "missing `data` array")),
    };

    let pagination = parse_pagination(object)?;

    let results = items
        .into_iter()
        .map(|item| map_entity::<T>(item, handle))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Mapped {} {} (offset {}, total {})",
        results.len(),
        T::NAME,
        pagination.offset,
        pagination.total
    );

    Ok(Returned {
        results,
        pagination,
    })
}

fn parse_pagination(mut object: Map<String, Value>) -> Result<Pagination> {
    let source = match object.remove("pagination") {
        Some(nested) => nested,
        None => Value::Object(object),
    };
    serde_json::from_value(source).map_err(|source| ModioError::MalformedResponse {
        entity: "pagination",
        source,
    })
}
