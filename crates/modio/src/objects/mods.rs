use serde::Deserialize;
use std::sync::Arc;

use super::de::{null_default, optional_object, Timestamp};
use super::rating::rate_mod;
use super::user::fetch_owner;
use super::{
    ClientHandle, Comment, Entity, Event, Image, Maturity, MetadataKvp, ModFile, ModMedia, RatingType,
    Returned, Status, Tag, TeamMember, User, Visibility,
};
use crate::api::dispatcher::{ApiRequest, Dispatcher};
use crate::core::{Result, ValidationError};
use crate::filter::{fields, Filter};

/// A mod profile
#[derive(Clone, Deserialize)]
pub struct Mod {
    pub id: u32,
    pub game_id: u32,
    pub status: Status,
    pub visible: Visibility,
    pub submitted_by: User,
    #[serde(default)]
    pub date_added: Timestamp,
    #[serde(default)]
    pub date_updated: Timestamp,
    #[serde(default)]
    pub date_live: Timestamp,
    #[serde(default)]
    pub maturity_option: Maturity,
    #[serde(default, deserialize_with = "optional_object")]
    pub logo: Option<Image>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    pub name: String,
    pub name_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_plaintext: Option<String>,
    #[serde(default)]
    pub metadata_blob: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub profile_url: String,
    /// Current release, if any
    #[serde(default, deserialize_with = "optional_object")]
    pub modfile: Option<ModFile>,
    #[serde(default, deserialize_with = "null_default")]
    pub media: ModMedia,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata_kvp: Vec<MetadataKvp>,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "optional_object")]
    pub stats: Option<ModStats>,
    #[serde(skip)]
    handle: ClientHandle,
}

entity_debug!(Mod {
    id,
    game_id,
    status,
    visible,
    submitted_by,
    date_added,
    date_updated,
    date_live,
    maturity_option,
    name,
    name_id,
    summary,
    profile_url,
    modfile,
    tags,
    stats,
});

impl Entity for Mod {
    const NAME: &'static str = "mod";

    fn attach(&mut self, handle: &ClientHandle) {
        self.submitted_by.attach(handle);
        if let Some(file) = self.modfile.as_mut() {
            file.attach(handle);
            file.game_id.get_or_insert(self.game_id);
        }
        self.handle = handle.clone();
    }
}

impl Mod {
    fn path(&self, rest: &str) -> String {
        format!("/games/{}/mods/{}{}", self.game_id, self.id, rest)
    }

    fn dispatcher(&self) -> Result<Arc<Dispatcher>> {
        self.handle.dispatcher()
    }

    pub async fn get_file(&self, file_id: u32) -> Result<ModFile> {
        let file: ModFile = self
            .dispatcher()?
            .fetch_one(ApiRequest::get(self.path(&format!("/files/{}", file_id))))
            .await?;
        Ok(file.with_game(self.game_id))
    }

    pub async fn get_files(&self, filter: Option<Filter>) -> Result<Returned<ModFile>> {
        let request = ApiRequest::get(self.path("/files")).filter_for(filter, &fields::FILES)?;
        let mut files: Returned<ModFile> = self.dispatcher()?.fetch_many(request).await?;
        files.results = files
            .results
            .into_iter()
            .map(|file| file.with_game(self.game_id))
            .collect();
        Ok(files)
    }

    pub async fn get_events(&self, filter: Option<Filter>) -> Result<Returned<Event>> {
        let request = ApiRequest::get(self.path("/events")).filter_for(filter, &fields::EVENTS)?;
        self.dispatcher()?.fetch_many(request).await
    }

    pub async fn get_team(&self, filter: Option<Filter>) -> Result<Returned<TeamMember>> {
        let request = ApiRequest::get(self.path("/team")).filter_for(filter, &fields::TEAM)?;
        self.dispatcher()?.fetch_many(request).await
    }

    pub async fn get_tags(&self, filter: Option<Filter>) -> Result<Returned<Tag>> {
        let request = ApiRequest::get(self.path("/tags")).filter_for(filter, &fields::TAGS)?;
        self.dispatcher()?.fetch_many(request).await
    }

    /// Mods this mod requires
    pub async fn get_dependencies(&self, filter: Option<Filter>) -> Result<Returned<Dependency>> {
        let request =
            ApiRequest::get(self.path("/dependencies")).filter_for(filter, &fields::DEPENDENCIES)?;
        self.dispatcher()?.fetch_many(request).await
    }

    pub async fn get_metadata(&self) -> Result<Returned<MetadataKvp>> {
        self.dispatcher()?
            .fetch_many(ApiRequest::get(self.path("/metadatakvp")))
            .await
    }

    pub async fn get_stats(&self) -> Result<ModStats> {
        self.dispatcher()?
            .fetch_one(ApiRequest::get(self.path("/stats")))
            .await
    }

    pub async fn get_comments(&self, filter: Option<Filter>) -> Result<Returned<Comment>> {
        let request = ApiRequest::get(self.path("/comments")).filter_for(filter, &fields::COMMENTS)?;
        let mut comments: Returned<Comment> = self.dispatcher()?.fetch_many(request).await?;
        comments.results = comments
            .results
            .into_iter()
            .map(|comment| comment.with_game(self.game_id))
            .collect();
        Ok(comments)
    }

    pub async fn get_comment(&self, comment_id: u32) -> Result<Comment> {
        let comment: Comment = self
            .dispatcher()?
            .fetch_one(ApiRequest::get(self.path(&format!("/comments/{}", comment_id))))
            .await?;
        Ok(comment.with_game(self.game_id))
    }

    /// Post a comment, optionally as a reply to `reply_to`
    pub async fn add_comment(&self, content: &str, reply_to: Option<u32>) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(ValidationError::InvalidArgument {
                argument: "content".to_string(),
                reason: "comment cannot be empty".to_string(),
            }
            .into());
        }

        let mut request = ApiRequest::post(self.path("/comments")).form("content", content);
        if let Some(reply_id) = reply_to {
            request = request.form("reply_id", reply_id);
        }
        let comment: Comment = self.dispatcher()?.fetch_one(request).await?;
        Ok(comment.with_game(self.game_id))
    }

    /// Subscribe the authenticated user, returning the updated mod
    pub async fn subscribe(&self) -> Result<Mod> {
        self.dispatcher()?
            .fetch_one(ApiRequest::post(self.path("/subscribe")))
            .await
    }

    pub async fn unsubscribe(&self) -> Result<()> {
        self.dispatcher()?
            .fetch_empty(ApiRequest::delete(self.path("/subscribe")))
            .await
    }

    pub async fn add_positive_rating(&self) -> Result<()> {
        let dispatcher = self.dispatcher()?;
        rate_mod(&dispatcher, self.game_id, self.id, RatingType::Good).await
    }

    pub async fn add_negative_rating(&self) -> Result<()> {
        let dispatcher = self.dispatcher()?;
        rate_mod(&dispatcher, self.game_id, self.id, RatingType::Bad).await
    }

    pub async fn remove_rating(&self) -> Result<()> {
        let dispatcher = self.dispatcher()?;
        rate_mod(&dispatcher, self.game_id, self.id, RatingType::Neutral).await
    }

    /// Apply `changes` to the profile and return the updated mod
    pub async fn edit(&self, changes: EditMod) -> Result<Mod> {
        let form = changes.into_form()?;
        let dispatcher = self.dispatcher()?;
        let request = form
            .into_iter()
            .fold(ApiRequest::put(self.path("")), |request, (key, value)| request.form(key, value));
        dispatcher.fetch_one(request).await
    }

    /// User who submitted the mod
    pub async fn get_owner(&self) -> Result<User> {
        fetch_owner(&self.handle, "mods", self.id).await
    }

    /// Delete the mod (the server archives it)
    pub async fn delete(&self) -> Result<()> {
        self.dispatcher()?
            .fetch_empty(ApiRequest::delete(self.path("")))
            .await
    }
}

/// Profile fields to change on a [`Mod`]; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditMod {
    pub status: Option<Status>,
    pub visible: Option<Visibility>,
    pub name: Option<String>,
    pub name_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub homepage_url: Option<String>,
    /// Maximum number of subscribers
    pub stock: Option<u32>,
    pub maturity_option: Option<Maturity>,
    pub metadata_blob: Option<String>,
}

impl EditMod {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn visible(mut self, visible: Visibility) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_id(mut self, name_id: impl Into<String>) -> Self {
        self.name_id = Some(name_id.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn homepage_url(mut self, url: impl Into<String>) -> Self {
        self.homepage_url = Some(url.into());
        self
    }

    pub fn stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn maturity_option(mut self, maturity: Maturity) -> Self {
        self.maturity_option = Some(maturity);
        self
    }

    pub fn metadata_blob(mut self, metadata: impl Into<String>) -> Self {
        self.metadata_blob = Some(metadata.into());
        self
    }

    fn into_form(self) -> Result<Vec<(&'static str, String)>> {
        let mut form = Vec::new();
        if let Some(status) = self.status {
            form.push(("status", status.value().to_string()));
        }
        if let Some(visible) = self.visible {
            form.push(("visible", visible.value().to_string()));
        }
        let text = [
            ("name", self.name),
            ("name_id", self.name_id),
            ("summary", self.summary),
            ("description", self.description),
            ("homepage_url", self.homepage_url),
        ];
        form.extend(text.into_iter().filter_map(|(key, value)| value.map(|value| (key, value))));
        if let Some(stock) = self.stock {
            form.push(("stock", stock.to_string()));
        }
        if let Some(maturity) = self.maturity_option {
            form.push(("maturity_option", maturity.bits().to_string()));
        }
        if let Some(metadata) = self.metadata_blob {
            form.push(("metadata_blob", metadata));
        }

        if form.is_empty() {
            return Err(ValidationError::InvalidArgument {
                argument: "changes".to_string(),
                reason: "at least one field must be set".to_string(),
            }
            .into());
        }
        Ok(form)
    }
}

/// A mod required by another mod
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    pub mod_id: u32,
    #[serde(default)]
    pub date_added: Timestamp,
}

impl Entity for Dependency {
    const NAME: &'static str = "dependency";
}

/// Download, subscriber and rating statistics of a mod
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModStats {
    pub mod_id: u32,
    #[serde(default)]
    pub popularity_rank_position: u32,
    #[serde(default)]
    pub popularity_rank_total_mods: u32,
    #[serde(default)]
    pub downloads_today: u64,
    #[serde(default)]
    pub downloads_total: u64,
    #[serde(default)]
    pub subscribers_total: u64,
    #[serde(default)]
    pub ratings_total: u32,
    #[serde(default)]
    pub ratings_positive: u32,
    #[serde(default)]
    pub ratings_negative: u32,
    #[serde(default)]
    pub ratings_percentage_positive: u32,
    /// Wilson score of the ratings; a good sort key
    #[serde(default)]
    pub ratings_weighted_aggregate: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub ratings_display_text: String,
    /// Stats are stale after this
    #[serde(default)]
    pub date_expires: Timestamp,
}

impl Entity for ModStats {
    const NAME: &'static str = "mod stats";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::map_entity;
    use serde_json::{json, Value};

    fn mod_json() -> Value {
        json!({
            "id": 2,
            "game_id": 2,
            "status": 1,
            "visible": 1,
            "submitted_by": {"id": 1, "name_id": "xant", "username": "XanT", "date_online": 1_509_922_961},
            "date_added": 1_492_564_103,
            "date_updated": 1_499_841_487,
            "date_live": 1_499_841_403,
            "maturity_option": 5,
            "logo": {
                "filename": "modio-dark.png",
                "original": "https://example.com/modio-dark.png",
                "thumb_320x180": "https://example.com/320.png"
            },
            "homepage_url": null,
            "name": "Rogue Knight Remastered",
            "name_id": "rogue-knight-remastered",
            "summary": "Rogue Knight is a brand new 2D pixel platformer.",
            "description": "<p>Rogue Knight is a brand new 2D pixel platformer.</p>",
            "metadata_blob": "rogue,hd,high-res,4k,hd textures",
            "profile_url": "https://rogue-knight.mod.io/rogue-knight-remastered",
            "modfile": {},
            "media": {"youtube": ["https://youtube.com/watch?v=dQw4w9WgXcQ"], "sketchfab": [], "images": []},
            "metadata_kvp": [{"metakey": "pistol-dmg", "metavalue": "800"}],
            "tags": [{"name": "Unity", "date_added": 1_499_841_487}],
            "stats": {
                "mod_id": 2,
                "popularity_rank_position": 13,
                "popularity_rank_total_mods": 204,
                "downloads_total": 27492,
                "subscribers_total": 16394,
                "ratings_total": 1230,
                "ratings_positive": 1047,
                "ratings_negative": 183,
                "ratings_percentage_positive": 91,
                "ratings_weighted_aggregate": 87.38,
                "ratings_display_text": "Very Positive",
                "date_expires": 1_492_564_103
            },
            "theme": {"primary": "#44bfd5"}
        })
    }

    #[test]
    fn test_mod_mapping_applies_coercions() {
        let m: Mod = map_entity(mod_json(), &ClientHandle::default()).unwrap();

        assert_eq!(m.status, Status::Accepted);
        assert_eq!(m.visible, Visibility::Public);
        assert!(m.maturity_option.contains(Maturity::ALCOHOL | Maturity::VIOLENCE));
        assert!(m.modfile.is_none());
        assert_eq!(m.homepage_url, None);
        assert_eq!(m.logo.as_ref().and_then(|l| l.small()), Some("https://example.com/320.png"));
        assert_eq!(m.media.youtube.len(), 1);
        assert_eq!(m.metadata_kvp[0].metakey, "pistol-dmg");
        assert_eq!(m.tags[0].name, "Unity");
        assert_eq!(m.date_live.datetime().unwrap().timestamp(), 1_499_841_403);

        let stats = m.stats.as_ref().unwrap();
        assert_eq!(stats.ratings_display_text, "Very Positive");
        assert_eq!(stats.downloads_today, 0);
    }

    #[test]
    fn test_embedded_modfile_inherits_game_id() {
        let mut raw = mod_json();
        raw["modfile"] = json!({
            "id": 7,
            "mod_id": 2,
            "virus_status": 0,
            "filename": "rogue.zip",
            "filehash": {"md5": "abc"},
            "download": {"binary_url": "https://example.com/rogue.zip", "date_expires": 0}
        });

        let m: Mod = map_entity(raw, &ClientHandle::default()).unwrap();
        let file = m.modfile.as_ref().unwrap();
        assert_eq!(file.game_id, Some(2));
        assert_eq!(file.virus_status, crate::objects::VirusStatus::NotScanned);
        assert!(!file.url_is_expired());
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected_before_sending() {
        let m: Mod = map_entity(mod_json(), &ClientHandle::default()).unwrap();
        let result = m.add_comment("   ", None).await;
        assert!(matches!(
            result,
            Err(crate::core::ModioError::Validation(ValidationError::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn test_edit_form_uses_wire_names() {
        let form = EditMod::new()
            .visible(Visibility::Hidden)
            .summary("Shorter")
            .homepage_url("https://example.com")
            .maturity_option(Maturity::ALCOHOL | Maturity::VIOLENCE)
            .metadata_blob("hd")
            .into_form()
            .unwrap();
        assert_eq!(
            form,
            vec![
                ("visible", "0".to_string()),
                ("summary", "Shorter".to_string()),
                ("homepage_url", "https://example.com".to_string()),
                ("maturity_option", "5".to_string()),
                ("metadata_blob", "hd".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_edit_is_rejected_before_sending() {
        let m: Mod = map_entity(mod_json(), &ClientHandle::default()).unwrap();
        let result = m.edit(EditMod::new()).await;
        assert!(matches!(
            result,
            Err(crate::core::ModioError::Validation(ValidationError::InvalidArgument { .. }))
        ));
    }
}
