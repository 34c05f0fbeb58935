use chrono::Utc;
use serde::Deserialize;

use super::de::{int_bool, null_default, Timestamp};
use super::user::fetch_owner;
use super::{ClientHandle, Entity, Platform, User, VirusStatus};
use crate::api::dispatcher::ApiRequest;
use crate::core::{ModioError, Result, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileHash {
    #[serde(default, deserialize_with = "null_default")]
    pub md5: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Download {
    #[serde(default, deserialize_with = "null_default")]
    pub binary_url: String,
    /// When `binary_url` stops working
    #[serde(default)]
    pub date_expires: Timestamp,
}

/// A released file of a mod
#[derive(Clone, Deserialize)]
pub struct ModFile {
    pub id: u32,
    pub mod_id: u32,
    /// Missing on files listed through `/me/files`
    #[serde(default)]
    pub game_id: Option<u32>,
    #[serde(default)]
    pub date_added: Timestamp,
    #[serde(default)]
    pub date_scanned: Timestamp,
    pub virus_status: VirusStatus,
    #[serde(default, deserialize_with = "int_bool")]
    pub virus_positive: bool,
    #[serde(default)]
    pub virustotal_hash: Option<String>,
    #[serde(default)]
    pub filesize: u64,
    #[serde(default)]
    pub filehash: FileHash,
    pub filename: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub metadata_blob: Option<String>,
    #[serde(default)]
    pub download: Download,
    #[serde(default, deserialize_with = "null_default")]
    pub platforms: Vec<Platform>,
    #[serde(skip)]
    handle: ClientHandle,
}

entity_debug!(ModFile {
    id,
    mod_id,
    game_id,
    date_added,
    virus_status,
    filesize,
    filehash,
    filename,
    version,
    download,
});

impl Entity for ModFile {
    const NAME: &'static str = "modfile";

    fn attach(&mut self, handle: &ClientHandle) {
        self.handle = handle.clone();
    }
}

impl ModFile {
    /// Check if the download url has expired
    pub fn url_is_expired(&self) -> bool {
        match self.download.date_expires.datetime() {
            Some(expires) => expires < Utc::now(),
            None => false,
        }
    }

    fn path(&self) -> Result<String> {
        let game_id = self.game_id.ok_or_else(|| ModioError::Unsupported {
            message: format!(
                "modfile {} has no game id (files from /me/files cannot be edited or deleted)",
                self.id
            ),
        })?;
        Ok(format!("/games/{}/mods/{}/files/{}", game_id, self.mod_id, self.id))
    }

    pub(crate) fn with_game(mut self, game_id: u32) -> Self {
        self.game_id.get_or_insert(game_id);
        self
    }

    /// Update the file's details, returning the edited file
    pub async fn edit(&self, changes: EditModFile) -> Result<ModFile> {
        let path = self.path()?;
        let form = changes.into_form()?;
        let dispatcher = self.handle.dispatcher()?;

        let request = form
            .into_iter()
            .fold(ApiRequest::put(path), |request, (key, value)| request.form(key, value));
        let file: ModFile = dispatcher.fetch_one(request).await?;
        Ok(match self.game_id {
            Some(game_id) => file.with_game(game_id),
            None => file,
        })
    }

    /// User who uploaded the file
    pub async fn get_owner(&self) -> Result<User> {
        fetch_owner(&self.handle, "files", self.id).await
    }

    pub async fn delete(&self) -> Result<()> {
        let path = self.path()?;
        self.handle
            .dispatcher()?
            .fetch_empty(ApiRequest::delete(path))
            .await
    }
}

/// Fields to change on a [`ModFile`]; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditModFile {
    pub version: Option<String>,
    pub changelog: Option<String>,
    /// Whether this file is the mod's current release
    pub active: Option<bool>,
    pub metadata_blob: Option<String>,
}

impl EditModFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn changelog(mut self, changelog: impl Into<String>) -> Self {
        self.changelog = Some(changelog.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn metadata_blob(mut self, metadata: impl Into<String>) -> Self {
        self.metadata_blob = Some(metadata.into());
        self
    }

    fn into_form(self) -> Result<Vec<(&'static str, String)>> {
        let mut form = Vec::new();
        if let Some(version) = self.version {
            form.push(("version", version));
        }
        if let Some(changelog) = self.changelog {
            form.push(("changelog", changelog));
        }
        if let Some(active) = self.active {
            form.push(("active", u8::from(active).to_string()));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::map_entity;
    use serde_json::{json, Value};

    fn modfile_json(expires: i64) -> Value {
        json!({
            "id": 2,
            "mod_id": 2,
            "date_added": 1_499_841_487,
            "date_scanned": 1_499_841_487,
            "virus_status": 1,
            "virus_positive": 0,
            "virustotal_hash": "f9a7bf4a95ce20787337b685a79677cae2281b83c63ab0a25f091407741692af-1508147401",
            "filesize": 15_181_122,
            "filehash": {"md5": "2d4a0e2d7273db6b0a94b9c69ae9d5a3"},
            "filename": "rogue-knight-v1.zip",
            "version": "1.3",
            "changelog": "VERSION 1.3 -- Changes -- Fixed critical castle floor bug.",
            "metadata_blob": null,
            "download": {
                "binary_url": "https://mod.io/mods/file/2/c489a0354111a4d76640d47f0cdcb294",
                "date_expires": expires
            },
            "platforms": [{"platform": "windows", "status": 1}]
        })
    }

    #[test]
    fn test_modfile_mapping() {
        let file: ModFile = map_entity(modfile_json(1_579_316_848), &ClientHandle::default()).unwrap();
        assert_eq!(file.filehash.md5, "2d4a0e2d7273db6b0a94b9c69ae9d5a3");
        assert_eq!(file.virus_status, VirusStatus::ScanComplete);
        assert!(!file.virus_positive);
        assert_eq!(file.metadata_blob, None);
        assert_eq!(file.game_id, None);
        assert_eq!(file.platforms[0].platform, crate::objects::TargetPlatform::Windows);
        assert!(file.url_is_expired());

        let fresh: ModFile =
            map_entity(modfile_json(Utc::now().timestamp() + 3600), &ClientHandle::default()).unwrap();
        assert!(!fresh.url_is_expired());
    }

    #[tokio::test]
    async fn test_file_without_game_cannot_be_edited() {
        let file: ModFile = map_entity(modfile_json(0), &ClientHandle::default()).unwrap();
        let result = file.edit(EditModFile::new().version("1.4")).await;
        assert!(matches!(result, Err(ModioError::Unsupported { .. })));
        assert!(matches!(file.delete().await, Err(ModioError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn test_empty_edit_is_rejected() {
        let file = map_entity::<ModFile>(modfile_json(0), &ClientHandle::default())
            .unwrap()
            .with_game(1);
        let result = file.edit(EditModFile::new()).await;
        assert!(matches!(
            result,
            Err(ModioError::Validation(ValidationError::InvalidArgument { .. }))
        ));
    }

    #[test]
    fn test_edit_form_encodes_active_as_integer() {
        let form = EditModFile::new().active(true).changelog("fixes").into_form().unwrap();
        assert_eq!(form, vec![("changelog", "fixes".to_string()), ("active", "1".to_string())]);
    }
}
