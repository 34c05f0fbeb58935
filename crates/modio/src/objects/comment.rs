use serde::Deserialize;

use super::de::{null_default, Timestamp};
use super::{ClientHandle, Entity, User};
use crate::api::dispatcher::{ApiRequest, Dispatcher};
use crate::core::{ModioError, Result};
use std::sync::Arc;

/// A comment on a mod profile
#[derive(Clone, Deserialize)]
pub struct Comment {
    pub id: u32,
    /// Id of the mod the comment belongs to
    pub resource_id: u32,
    pub user: User,
    #[serde(default)]
    pub date_added: Timestamp,
    /// Id of the comment this replies to, 0 for top level comments
    #[serde(default)]
    pub reply_id: u32,
    /// Position in the thread: `01`, `02`, `02.01`, ...
    #[serde(default, deserialize_with = "null_default")]
    pub thread_position: String,
    #[serde(default)]
    pub karma: i64,
    /// Karma given by users who were not logged in
    #[serde(default)]
    pub karma_guest: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub content: String,
    /// Sent by newer API versions, otherwise filled in from the parent mod
    #[serde(default)]
    game_id: Option<u32>,
    #[serde(skip)]
    handle: ClientHandle,
}

entity_debug!(Comment {
    id,
    resource_id,
    user,
    date_added,
    reply_id,
    thread_position,
    karma,
    karma_guest,
    content,
    game_id,
});

impl Entity for Comment {
    const NAME: &'static str = "comment";

    fn attach(&mut self, handle: &ClientHandle) {
        self.user.attach(handle);
        self.handle = handle.clone();
    }
}

impl Comment {
    /// Nesting depth from 1 (top level) to 3
    pub fn level(&self) -> usize {
        self.thread_position.split('.').count()
    }

    pub fn game_id(&self) -> Option<u32> {
        self.game_id
    }

    pub(crate) fn with_game(mut self, game_id: u32) -> Self {
        self.game_id = Some(game_id);
        self
    }

    fn context(&self) -> Result<(Arc<Dispatcher>, u32, String)> {
        let game_id = self.game_id.ok_or_else(|| ModioError::Unsupported {
            message: format!("comment {} was not fetched through its mod, game id unknown", self.id),
        })?;
        let path = format!("/games/{}/mods/{}/comments/{}", game_id, self.resource_id, self.id);
        Ok((self.handle.dispatcher()?, game_id, path))
    }

    /// Replace the content, returning the updated comment
    pub async fn edit(&self, content: &str) -> Result<Comment> {
        let (dispatcher, game_id, path) = self.context()?;
        let comment: Comment = dispatcher
            .fetch_one(ApiRequest::put(path).form("content", content))
            .await?;
        Ok(comment.with_game(game_id))
    }

    pub async fn delete(&self) -> Result<()> {
        let (dispatcher, _, path) = self.context()?;
        dispatcher.fetch_empty(ApiRequest::delete(path)).await
    }

    pub async fn add_positive_karma(&self) -> Result<Comment> {
        self.add_karma(1).await
    }

    pub async fn add_negative_karma(&self) -> Result<Comment> {
        self.add_karma(-1).await
    }

    async fn add_karma(&self, karma: i8) -> Result<Comment> {
        let (dispatcher, game_id, path) = self.context()?;
        let comment: Comment = dispatcher
            .fetch_one(ApiRequest::post(format!("{}/karma", path)).form("karma", karma))
            .await?;
        Ok(comment.with_game(game_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::map_entity;
    use serde_json::json;

    fn comment(position: &str) -> Comment {
        map_entity(
            json!({
                "id": 2,
                "resource_id": 2,
                "user": {"id": 1, "username": "XanT"},
                "date_added": 1_499_841_487,
                "reply_id": 0,
                "thread_position": position,
                "karma": 3,
                "karma_guest": 2,
                "content": "This mod is kickass! Great work!"
            }),
            &ClientHandle::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_level_follows_thread_position() {
        assert_eq!(comment("01").level(), 1);
        assert_eq!(comment("02.01").level(), 2);
        assert_eq!(comment("02.01.03").level(), 3);
    }

    #[test]
    fn test_guest_karma_is_kept_apart() {
        let comment = comment("01");
        assert_eq!(comment.karma, 3);
        assert_eq!(comment.karma_guest, 2);
        assert!(format!("{:?}", comment).contains("karma_guest: 2"));
    }

    #[tokio::test]
    async fn test_comment_without_game_is_unsupported() {
        let result = comment("01").delete().await;
        match result {
            Err(ModioError::Unsupported { message }) => assert!(message.contains("game id unknown")),
            other => panic!("expected Unsupported, got {:?}", other),
        }
    }
}
