use serde::Deserialize;
use std::sync::Arc;

use super::de::{null_default, optional_object, Timestamp};
use super::user::fetch_owner;
use super::{
    ApiAccess, ClientHandle, Community, Curation, Entity, Event, Image, MaturityOptions, Mod, ModStats,
    Platform, Presentation, Returned, Revenue, Status, Submission, TagOption, User,
};
use crate::api::dispatcher::{ApiRequest, Dispatcher};
use crate::core::Result;
use crate::filter::{fields, Filter};

/// A game profile
#[derive(Clone, Deserialize)]
pub struct Game {
    pub id: u32,
    pub status: Status,
    #[serde(default, deserialize_with = "optional_object")]
    pub submitted_by: Option<User>,
    #[serde(default)]
    pub date_added: Timestamp,
    #[serde(default)]
    pub date_updated: Timestamp,
    #[serde(default)]
    pub date_live: Timestamp,
    pub presentation_option: Presentation,
    pub submission_option: Submission,
    pub curation_option: Curation,
    #[serde(default)]
    pub community_options: Community,
    #[serde(default)]
    pub revenue_options: Revenue,
    #[serde(default)]
    pub api_access_options: ApiAccess,
    pub maturity_options: MaturityOptions,
    /// What the game calls its mods, e.g. "items"
    #[serde(default, deserialize_with = "null_default")]
    pub ugc_name: String,
    #[serde(default, deserialize_with = "optional_object")]
    pub icon: Option<Image>,
    #[serde(default, deserialize_with = "optional_object")]
    pub logo: Option<Image>,
    #[serde(default, deserialize_with = "optional_object")]
    pub header: Option<Image>,
    pub name: String,
    pub name_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub summary: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub instructions_url: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub profile_url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tag_options: Vec<TagOption>,
    #[serde(default, deserialize_with = "null_default")]
    pub platforms: Vec<Platform>,
    #[serde(skip)]
    handle: ClientHandle,
}

entity_debug!(Game {
    id,
    status,
    submitted_by,
    date_added,
    date_live,
    presentation_option,
    submission_option,
    curation_option,
    community_options,
    revenue_options,
    api_access_options,
    maturity_options,
    name,
    name_id,
    profile_url,
    tag_options,
});

impl Entity for Game {
    const NAME: &'static str = "game";

    fn attach(&mut self, handle: &ClientHandle) {
        if let Some(user) = self.submitted_by.as_mut() {
            user.attach(handle);
        }
        self.handle = handle.clone();
    }
}

impl Game {
    fn path(&self, rest: &str) -> String {
        format!("/games/{}{}", self.id, rest)
    }

    fn dispatcher(&self) -> Result<Arc<Dispatcher>> {
        self.handle.dispatcher()
    }

    pub async fn get_mod(&self, mod_id: u32) -> Result<Mod> {
        self.dispatcher()?
            .fetch_one(ApiRequest::get(self.path(&format!("/mods/{}", mod_id))))
            .await
    }

    pub async fn get_mods(&self, filter: Option<Filter>) -> Result<Returned<Mod>> {
        let request = ApiRequest::get(self.path("/mods")).filter_for(filter, &fields::MODS)?;
        self.dispatcher()?.fetch_many(request).await
    }

    /// Events of every mod of the game
    pub async fn get_mod_events(&self, filter: Option<Filter>) -> Result<Returned<Event>> {
        let request = ApiRequest::get(self.path("/mods/events")).filter_for(filter, &fields::EVENTS)?;
        self.dispatcher()?.fetch_many(request).await
    }

    /// Tag groups mods of this game can be tagged with
    pub async fn get_tag_options(&self, filter: Option<Filter>) -> Result<Returned<TagOption>> {
        let request = ApiRequest::get(self.path("/tags")).filter_for(filter, &fields::TAG_OPTIONS)?;
        self.dispatcher()?.fetch_many(request).await
    }

    pub async fn get_stats(&self) -> Result<GameStats> {
        self.dispatcher()?
            .fetch_one(ApiRequest::get(self.path("/stats")))
            .await
    }

    /// User who submitted the game
    pub async fn get_owner(&self) -> Result<User> {
        fetch_owner(&self.handle, "games", self.id).await
    }

    pub async fn get_mods_stats(&self, filter: Option<Filter>) -> Result<Returned<ModStats>> {
        let request = ApiRequest::get(self.path("/mods/stats")).filter_for(filter, &fields::MOD_STATS)?;
        self.dispatcher()?.fetch_many(request).await
    }
}

/// Aggregate statistics of a game's mods
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameStats {
    pub game_id: u32,
    #[serde(default)]
    pub mods_count_total: u64,
    #[serde(default)]
    pub mods_downloads_today: u64,
    #[serde(default)]
    pub mods_downloads_total: u64,
    #[serde(default)]
    pub mods_downloads_daily_average: u64,
    #[serde(default)]
    pub mods_subscribers_total: u64,
    #[serde(default)]
    pub date_expires: Timestamp,
}

impl Entity for GameStats {
    const NAME: &'static str = "game stats";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::map_entity;
    use serde_json::json;

    #[test]
    fn test_game_mapping_with_flags_and_tags() {
        let game: Game = map_entity(
            json!({
                "id": 2,
                "status": 1,
                "submitted_by": {"id": 1, "username": "XanT"},
                "date_added": 1_493_702_614,
                "date_updated": 0,
                "presentation_option": 0,
                "submission_option": 1,
                "curation_option": 2,
                "community_options": 3,
                "revenue_options": 1500,
                "api_access_options": 3,
                "maturity_options": 1,
                "icon": null,
                "logo": {"filename": "logo.png", "original": "https://example.com/logo.png"},
                "name": "Rogue Knight",
                "name_id": "rogue-knight",
                "tag_options": [{"name": "Theme", "type": "checkbox", "hidden": false, "tags": ["Horror"]}],
                "platforms": [{"platform": "ps5", "label": "PlayStation 5", "moderated": true}]
            }),
            &ClientHandle::default(),
        )
        .unwrap();

        assert_eq!(game.curation_option, Curation::FullCuration);
        assert!(game.community_options.contains(Community::DISCUSSION_BOARDS | Community::GUIDES_NEWS));
        assert_eq!(game.revenue_options.bits(), 1500);
        assert!(game.api_access_options.contains(ApiAccess::DIRECT_DOWNLOADS));
        assert_eq!(game.maturity_options, MaturityOptions::Allowed);
        assert!(!game.date_updated.is_set());
        assert!(game.icon.is_none());
        assert!(game.logo.is_some());
        assert_eq!(game.tag_options[0].tags, vec!["Horror"]);
        assert_eq!(game.platforms[0].label, "PlayStation 5");
        assert!(game.platforms[0].moderated);
        assert_eq!(game.submitted_by.as_ref().map(|u| u.id), Some(1));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let stats: GameStats = map_entity(
            json!({
                "game_id": 2,
                "mods_count_total": 13,
                "mods_downloads_today": 204,
                "mods_downloads_total": 27492,
                "mods_downloads_daily_average": 1230,
                "mods_subscribers_total": 16394,
                "date_expires": 1_492_564_103,
                "brand_new_field": {"nested": true}
            }),
            &ClientHandle::default(),
        )
        .unwrap();
        assert_eq!(stats.mods_count_total, 13);
        assert!(stats.date_expires.is_set());
    }
}
