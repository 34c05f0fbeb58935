use serde::Deserialize;

use super::de::{null_default, optional_object, Timestamp};
use super::{ClientHandle, Entity, Image, Level};
use crate::api::dispatcher::ApiRequest;
use crate::core::Result;

/// A mod.io user
#[derive(Clone, Deserialize)]
pub struct User {
    pub id: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub name_id: String,
    pub username: String,
    #[serde(default)]
    pub date_online: Timestamp,
    #[serde(default, deserialize_with = "optional_object")]
    pub avatar: Option<Image>,
    /// Country/city, e.g. `Australia/Brisbane`
    #[serde(default, deserialize_with = "null_default")]
    pub timezone: String,
    #[serde(default, deserialize_with = "null_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_default")]
    pub profile_url: String,
    #[serde(skip)]
    handle: ClientHandle,
}

entity_debug!(User {
    id,
    name_id,
    username,
    date_online,
    avatar,
    timezone,
    language,
    profile_url,
});

impl Entity for User {
    const NAME: &'static str = "user";

    fn attach(&mut self, handle: &ClientHandle) {
        self.handle = handle.clone();
    }
}

impl User {
    /// Hide every mod authored by this user from the authenticated user
    pub async fn mute(&self) -> Result<()> {
        self.handle
            .dispatcher()?
            .fetch_empty(ApiRequest::post(format!("/users/{}/mute", self.id)))
            .await
    }

    pub async fn unmute(&self) -> Result<()> {
        self.handle
            .dispatcher()?
            .fetch_empty(ApiRequest::delete(format!("/users/{}/mute", self.id)))
            .await
    }
}

/// Original submitter of a resource; `resource_type` is `games`, `mods` or `files`
pub(crate) async fn fetch_owner(
    handle: &ClientHandle,
    resource_type: &'static str,
    resource_id: u32,
) -> Result<User> {
    let dispatcher = handle.dispatcher()?;
    let request = ApiRequest::post("/general/ownership")
        .form("resource_type", resource_type)
        .form("resource_id", resource_id);
    dispatcher.fetch_one(request).await
}

/// A user in the context of a mod's team
#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    /// Id of the membership, not of the user
    pub id: u32,
    pub user: User,
    pub level: Level,
    #[serde(default)]
    pub date_added: Timestamp,
    /// Custom title given to the member
    #[serde(default, deserialize_with = "null_default")]
    pub position: String,
}

impl Entity for TeamMember {
    const NAME: &'static str = "team member";

    fn attach(&mut self, handle: &ClientHandle) {
        self.user.attach(handle);
    }
}

impl TeamMember {
    pub async fn mute(&self) -> Result<()> {
        self.user.mute().await
    }

    pub async fn unmute(&self) -> Result<()> {
        self.user.unmute().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModioError;
    use crate::objects::map_entity;
    use serde_json::json;

    #[test]
    fn test_user_mapping() {
        let user: User = map_entity(
            json!({
                "id": 1,
                "name_id": "xant",
                "username": "XanT",
                "date_online": 1_509_922_961,
                "avatar": {
                    "filename": "avatar.png",
                    "original": "https://example.com/avatar.png",
                    "thumb_50x50": "https://example.com/50.png",
                    "thumb_100x100": "https://example.com/100.png"
                },
                "timezone": null,
                "language": "",
                "profile_url": "https://mod.io/u/xant"
            }),
            &ClientHandle::default(),
        )
        .unwrap();

        assert_eq!(user.username, "XanT");
        assert_eq!(user.timezone, "");
        assert!(user.date_online.is_set());
        let avatar = user.avatar.as_ref().unwrap();
        assert_eq!(avatar.small(), Some("https://example.com/50.png"));
        assert!(!format!("{:?}", user).contains("handle"));
    }

    #[test]
    fn test_team_member_level() {
        let member: TeamMember = map_entity(
            json!({
                "id": 457,
                "user": {"id": 1, "username": "XanT", "avatar": {}},
                "level": 8,
                "date_added": 1_492_058_857,
                "position": "Supreme Overlord"
            }),
            &ClientHandle::default(),
        )
        .unwrap();

        assert_eq!(member.level, Level::Admin);
        assert!(member.user.avatar.is_none());
        assert_eq!(member.position, "Supreme Overlord");
    }

    #[tokio::test]
    async fn test_detached_user_cannot_mute() {
        let user: User =
            map_entity(json!({"id": 1, "username": "XanT"}), &ClientHandle::default()).unwrap();
        assert!(matches!(user.mute().await, Err(ModioError::Unsupported { .. })));
    }
}
