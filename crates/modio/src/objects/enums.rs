//! Enumerations and bit sets used by the entities
//!
//! Every enum tolerates values it has never seen: integer enums fall back to
//! `Unknown(i64)` and string enums to `Other(String)`, so a server-side
//! addition never breaks mapping. All of them convert into
//! [`FilterValue`](crate::filter::FilterValue) and can be passed straight to
//! a filter.

use super::de::{flag_set, int_enum, str_enum};

int_enum! {
    /// Moderation status of a game or mod
    pub enum Status {
        NotAccepted = 0,
        Accepted = 1,
        Archived = 2,
        Deleted = 3,
    }
}

int_enum! {
    /// How a game's mods are displayed on mod.io
    pub enum Presentation {
        Grid = 0,
        Table = 1,
    }
}

int_enum! {
    /// Whether mods may be submitted through any tool or only the game's
    pub enum Submission {
        Restricted = 0,
        Unrestricted = 1,
    }
}

int_enum! {
    pub enum Curation {
        NoCuration = 0,
        PaidCuration = 1,
        FullCuration = 2,
    }
}

int_enum! {
    /// Whether a game accepts mature content at all
    pub enum MaturityOptions {
        Forbidden = 0,
        Allowed = 1,
    }
}

int_enum! {
    pub enum VirusStatus {
        NotScanned = 0,
        ScanComplete = 1,
        InProgress = 2,
        TooLarge = 3,
        NotFound = 4,
        Error = 5,
    }
}

int_enum! {
    pub enum Visibility {
        Hidden = 0,
        Public = 1,
    }
}

int_enum! {
    /// Permission level of a team member
    pub enum Level {
        Moderator = 1,
        Creator = 4,
        Admin = 8,
    }
}

int_enum! {
    pub enum RatingType {
        Good = 1,
        Neutral = 0,
        Bad = -1,
    }
}

str_enum! {
    /// Kind of a mod or user event
    pub enum EventType {
        FileChanged = "MODFILE_CHANGED",
        Available = "MOD_AVAILABLE",
        Unavailable = "MOD_UNAVAILABLE",
        Edited = "MOD_EDITED",
        Deleted = "MOD_DELETED",
        TeamChanged = "MOD_TEAM_CHANGED",
        CommentAdded = "MOD_COMMENT_ADDED",
        CommentDeleted = "MOD_COMMENT_DELETED",
        TeamJoin = "USER_TEAM_JOIN",
        TeamLeave = "USER_TEAM_LEAVE",
        Subscribe = "USER_SUBSCRIBE",
        Unsubscribe = "USER_UNSUBSCRIBE",
    }
}

str_enum! {
    pub enum TargetPlatform {
        Windows = "windows",
        Mac = "mac",
        Linux = "linux",
        Android = "android",
        Ios = "ios",
        XboxOne = "xboxone",
        XboxSeriesX = "xboxseriesx",
        Ps4 = "ps4",
        Ps5 = "ps5",
        Switch = "switch",
        Oculus = "oculus",
    }
}

flag_set! {
    /// Community features enabled for a game
    pub struct Community {
        const DISCUSSION_BOARDS = 1;
        const GUIDES_NEWS = 2;
    }
}

flag_set! {
    /// Revenue capabilities mods of a game may use
    pub struct Revenue {
        const SOLD = 1;
        const DONATIONS = 2;
        const TRADED = 4;
        const FULL_CONTROL = 8;
    }
}

flag_set! {
    pub struct ApiAccess {
        /// Third parties may access the game's API
        const THIRD_PARTY = 1;
        /// Mod files may be downloaded directly
        const DIRECT_DOWNLOADS = 2;
    }
}

flag_set! {
    /// Mature content a mod contains
    pub struct Maturity {
        const ALCOHOL = 1;
        const DRUGS = 2;
        const VIOLENCE = 4;
        const EXPLICIT = 8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;

    #[test]
    fn test_unknown_integer_values_are_kept() {
        assert_eq!(Status::from(1), Status::Accepted);
        assert_eq!(Status::from(42), Status::Unknown(42));
        assert_eq!(Status::Unknown(42).value(), 42);
        assert_eq!(RatingType::from(-1), RatingType::Bad);

        let status: Status = serde_json::from_str("7").unwrap();
        assert_eq!(status, Status::Unknown(7));
    }

    #[test]
    fn test_unknown_strings_are_kept() {
        let event: EventType = serde_json::from_str("\"MOD_EDITED\"").unwrap();
        assert_eq!(event, EventType::Edited);

        let event: EventType = serde_json::from_str("\"MOD_TELEPORTED\"").unwrap();
        assert_eq!(event, EventType::Other("MOD_TELEPORTED".to_string()));
        assert_eq!(event.to_string(), "MOD_TELEPORTED");
    }

    #[test]
    fn test_flags_keep_unknown_bits() {
        let maturity: Maturity = serde_json::from_str("19").unwrap();
        assert!(maturity.contains(Maturity::ALCOHOL | Maturity::DRUGS));
        assert!(!maturity.contains(Maturity::VIOLENCE));
        assert_eq!(maturity.bits(), 19);

        let mut revenue = Revenue::empty();
        revenue |= Revenue::SOLD;
        revenue |= Revenue::TRADED;
        assert_eq!(revenue.bits(), 5);
        assert_eq!(FilterValue::from(revenue), FilterValue::Flags(5));
    }
}
