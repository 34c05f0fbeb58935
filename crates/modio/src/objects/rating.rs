use serde::Deserialize;

use super::de::Timestamp;
use super::{ClientHandle, Entity, RatingType};
use crate::api::dispatcher::{ApiRequest, Dispatcher};
use crate::core::Result;

/// A rating the authenticated user gave a mod
#[derive(Clone, Deserialize)]
pub struct Rating {
    pub game_id: u32,
    pub mod_id: u32,
    pub rating: RatingType,
    #[serde(default)]
    pub date_added: Timestamp,
    #[serde(skip)]
    handle: ClientHandle,
}

entity_debug!(Rating {
    game_id,
    mod_id,
    rating,
    date_added,
});

impl Entity for Rating {
    const NAME: &'static str = "rating";

    fn attach(&mut self, handle: &ClientHandle) {
        self.handle = handle.clone();
    }
}

/// Rate mod `mod_id` of game `game_id` as the authenticated user
pub(crate) async fn rate_mod(
    dispatcher: &Dispatcher,
    game_id: u32,
    mod_id: u32,
    rating: RatingType,
) -> Result<()> {
    let request = ApiRequest::post(format!("/games/{}/mods/{}/ratings", game_id, mod_id))
        .form("rating", rating.value());
    dispatcher.fetch_empty(request).await
}

impl Rating {
    pub async fn add_positive(&self) -> Result<()> {
        let dispatcher = self.handle.dispatcher()?;
        rate_mod(&dispatcher, self.game_id, self.mod_id, RatingType::Good).await
    }

    pub async fn add_negative(&self) -> Result<()> {
        let dispatcher = self.handle.dispatcher()?;
        rate_mod(&dispatcher, self.game_id, self.mod_id, RatingType::Bad).await
    }

    /// Withdraw the rating by rating the mod neutral
    pub async fn delete(&self) -> Result<()> {
        let dispatcher = self.handle.dispatcher()?;
        rate_mod(&dispatcher, self.game_id, self.mod_id, RatingType::Neutral).await
    }
}
