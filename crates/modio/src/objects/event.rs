use serde::Deserialize;

use super::de::Timestamp;
use super::{Entity, EventType};

/// Something that happened to a mod or a user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Event {
    pub id: u32,
    /// Only present on user events
    #[serde(default)]
    pub game_id: Option<u32>,
    pub mod_id: u32,
    pub user_id: u32,
    pub date_added: Timestamp,
    pub event_type: EventType,
}

impl Entity for Event {
    const NAME: &'static str = "event";
}
