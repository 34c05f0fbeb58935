//! Small value types shared by several entities

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::de::{int_bool, null_default, Timestamp};
use super::{Entity, TargetPlatform};

/// One resized copy of an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// An image with its thumbnails
///
/// The API sends thumbnails as `thumb_<width>x<height>` keys whose set varies
/// by image kind (logos, avatars, icons, gallery images), so they are collected
/// generically and ordered by width.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawImage")]
pub struct Image {
    pub filename: String,
    pub original: String,
    thumbnails: Vec<Thumbnail>,
}

#[derive(Deserialize)]
struct RawImage {
    #[serde(default, deserialize_with = "null_default")]
    filename: String,
    #[serde(default, deserialize_with = "null_default")]
    original: String,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

fn parse_thumb_key(key: &str) -> Option<(u32, u32)> {
    let size = key.strip_prefix("thumb_")?;
    let (width, height) = size.split_once('x')?;
    Some((width.parse().ok()?, height.parse().ok()?))
}

impl From<RawImage> for Image {
    fn from(raw: RawImage) -> Self {
        let mut thumbnails: Vec<Thumbnail> = raw
            .rest
            .into_iter()
            .filter_map(|(key, value)| {
                let (width, height) = parse_thumb_key(&key)?;
                match value {
                    Value::String(url) if !url.is_empty() => Some(Thumbnail { width, height, url }),
                    _ => None,
                }
            })
            .collect();
        thumbnails.sort_by_key(|t| (t.width, t.height));

        Image {
            filename: raw.filename,
            original: raw.original,
            thumbnails,
        }
    }
}

impl Image {
    /// Thumbnails ordered from smallest to largest
    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    pub fn thumbnail(&self, width: u32, height: u32) -> Option<&str> {
        self.thumbnails
            .iter()
            .find(|t| t.width == width && t.height == height)
            .map(|t| t.url.as_str())
    }

    pub fn small(&self) -> Option<&str> {
        self.thumbnails.first().map(|t| t.url.as_str())
    }

    pub fn medium(&self) -> Option<&str> {
        self.thumbnails
            .get(self.thumbnails.len().saturating_sub(1) / 2)
            .map(|t| t.url.as_str())
    }

    pub fn large(&self) -> Option<&str> {
        self.thumbnails.last().map(|t| t.url.as_str())
    }
}

/// Plain acknowledgement returned by some endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub code: u16,
    pub message: String,
}

impl Entity for Message {
    const NAME: &'static str = "message";
}

/// Platform a game or file is available on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Platform {
    pub platform: TargetPlatform,
    #[serde(default, deserialize_with = "null_default")]
    pub label: String,
    #[serde(default, deserialize_with = "int_bool")]
    pub moderated: bool,
}

/// A tag group a mod may pick one or more tags from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagOption {
    pub name: String,
    /// `"checkbox"` (many tags) or `"dropdown"` (one tag)
    #[serde(rename = "type", default = "default_tag_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "int_bool")]
    pub hidden: bool,
    #[serde(default, deserialize_with = "int_bool")]
    pub locked: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
}

fn default_tag_kind() -> String {
    "dropdown".to_string()
}

impl Entity for TagOption {
    const NAME: &'static str = "tag option";
}

/// Media attached to a mod profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModMedia {
    #[serde(default, deserialize_with = "null_default")]
    pub youtube: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub sketchfab: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<Image>,
}

/// Result of the email exchange flow
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    #[serde(default)]
    pub code: u16,
    pub access_token: String,
    #[serde(default)]
    pub date_expires: Timestamp,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("code", &self.code)
            .field("access_token", &"***")
            .field("date_expires", &self.date_expires)
            .finish()
    }
}

impl Entity for AccessToken {
    const NAME: &'static str = "access token";
}

/// Tag applied to a mod
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub date_added: Timestamp,
}

impl Entity for Tag {
    const NAME: &'static str = "tag";
}

/// Key/value metadata set by the game developer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataKvp {
    pub metakey: String,
    pub metavalue: String,
}

impl Entity for MetadataKvp {
    const NAME: &'static str = "metadata";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_thumbnails_are_ordered_by_width() {
        let image: Image = serde_json::from_value(json!({
            "filename": "logo.png",
            "original": "https://example.com/logo.png",
            "thumb_1280x720": "https://example.com/1280.png",
            "thumb_320x180": "https://example.com/320.png",
            "thumb_640x360": "https://example.com/640.png",
        }))
        .unwrap();

        assert_eq!(image.thumbnails().len(), 3);
        assert_eq!(image.small(), Some("https://example.com/320.png"));
        assert_eq!(image.medium(), Some("https://example.com/640.png"));
        assert_eq!(image.large(), Some("https://example.com/1280.png"));
        assert_eq!(image.thumbnail(640, 360), Some("https://example.com/640.png"));
    }

    #[test]
    fn test_image_without_thumbnails() {
        let image: Image = serde_json::from_value(json!({
            "filename": "icon.png",
            "original": "https://example.com/icon.png",
            "thumb_64x64": "",
        }))
        .unwrap();
        assert!(image.small().is_none());
        assert!(image.large().is_none());
    }

    #[test]
    fn test_tag_option_defaults() {
        let option: TagOption = serde_json::from_value(json!({"name": "Theme"})).unwrap();
        assert_eq!(option.kind, "dropdown");
        assert!(!option.hidden);
        assert!(option.tags.is_empty());

        let option: TagOption = serde_json::from_value(json!({
            "name": "Engine",
            "type": "checkbox",
            "hidden": 1,
            "locked": false,
            "tags": ["Unity", "Unreal"],
        }))
        .unwrap();
        assert_eq!(option.kind, "checkbox");
        assert!(option.hidden);
        assert_eq!(option.tags, vec!["Unity", "Unreal"]);
    }

    #[test]
    fn test_access_token_debug_hides_token() {
        let token: AccessToken = serde_json::from_value(json!({
            "code": 200,
            "access_token": "eyJ0eXAi",
            "date_expires": 1_570_673_249,
        }))
        .unwrap();
        assert!(!format!("{:?}", token).contains("eyJ0eXAi"));
        assert!(token.date_expires.is_set());
    }
}
