//! Per-resource allow-lists of filterable and sortable fields

use super::{FieldSpec, Filter, FilterSchema};

pub static GAMES: FilterSchema = FilterSchema {
    resource: "games",
    fields: &[
        FieldSpec::int("id").sortable(),
        FieldSpec::int("status").sortable(),
        FieldSpec::int("submitted_by").sortable(),
        FieldSpec::timestamp("date_added").sortable(),
        FieldSpec::timestamp("date_updated").sortable(),
        FieldSpec::timestamp("date_live").sortable(),
        FieldSpec::string("name").sortable(),
        FieldSpec::string("name_id").sortable(),
        FieldSpec::string("summary"),
        FieldSpec::string("instructions_url"),
        FieldSpec::string("ugc_name"),
        FieldSpec::int("presentation_option"),
        FieldSpec::int("submission_option"),
        FieldSpec::int("curation_option"),
        FieldSpec::flags("community_options"),
        FieldSpec::flags("revenue_options"),
        FieldSpec::flags("api_access_options"),
        FieldSpec::int("maturity_options"),
    ],
};

pub static MODS: FilterSchema = FilterSchema {
    resource: "mods",
    fields: &[
        FieldSpec::int("id").sortable(),
        FieldSpec::int("game_id"),
        FieldSpec::int("status"),
        FieldSpec::int("visible"),
        FieldSpec::int("submitted_by"),
        FieldSpec::timestamp("date_added").sortable(),
        FieldSpec::timestamp("date_updated").sortable(),
        FieldSpec::timestamp("date_live").sortable(),
        FieldSpec::flags("maturity_option"),
        FieldSpec::string("name").sortable(),
        FieldSpec::string("name_id").sortable(),
        FieldSpec::string("summary"),
        FieldSpec::string("description"),
        FieldSpec::string("homepage_url"),
        FieldSpec::int("modfile"),
        FieldSpec::string("metadata_blob"),
        FieldSpec::string("metadata_kvp"),
        FieldSpec::string("tags"),
        FieldSpec::string("platform_status"),
        FieldSpec::sort_only("downloads"),
        FieldSpec::sort_only("popular"),
        FieldSpec::sort_only("rating"),
        FieldSpec::sort_only("subscribers"),
    ],
};

pub static FILES: FilterSchema = FilterSchema {
    resource: "modfiles",
    fields: &[
        FieldSpec::int("id").sortable(),
        FieldSpec::int("mod_id").sortable(),
        FieldSpec::timestamp("date_added").sortable(),
        FieldSpec::timestamp("date_scanned").sortable(),
        FieldSpec::int("virus_status").sortable(),
        FieldSpec::int("virus_positive").sortable(),
        FieldSpec::int("filesize").sortable(),
        FieldSpec::string("filehash"),
        FieldSpec::string("filename").sortable(),
        FieldSpec::string("version").sortable(),
        FieldSpec::string("changelog"),
        FieldSpec::string("metadata_blob"),
    ],
};

pub static USERS: FilterSchema = FilterSchema {
    resource: "users",
    fields: &[
        FieldSpec::int("id").sortable(),
        FieldSpec::string("name_id").sortable(),
        FieldSpec::timestamp("date_online").sortable(),
        FieldSpec::string("username").sortable(),
        FieldSpec::string("timezone"),
        FieldSpec::string("language"),
    ],
};

/// Mod events of one game or one mod
pub static EVENTS: FilterSchema = FilterSchema {
    resource: "events",
    fields: &[
        FieldSpec::int("id").sortable(),
        FieldSpec::int("mod_id").sortable(),
        FieldSpec::int("user_id").sortable(),
        FieldSpec::timestamp("date_added").sortable(),
        FieldSpec::string("event_type"),
        FieldSpec::boolean("latest"),
        FieldSpec::boolean("subscribed"),
    ],
};

/// Events of the authenticated user
pub static USER_EVENTS: FilterSchema = FilterSchema {
    resource: "user events",
    fields: &[
        FieldSpec::int("id").sortable(),
        FieldSpec::int("game_id"),
        FieldSpec::int("mod_id"),
        FieldSpec::int("user_id"),
        FieldSpec::timestamp("date_added").sortable(),
        FieldSpec::string("event_type"),
    ],
};

pub static COMMENTS: FilterSchema = FilterSchema {
    resource: "comments",
    fields: &[
        FieldSpec::int("id").sortable(),
        FieldSpec::int("mod_id").sortable(),
        FieldSpec::int("submitted_by").sortable(),
        FieldSpec::timestamp("date_added").sortable(),
        FieldSpec::int("reply_id").sortable(),
        FieldSpec::string("thread_position").sortable(),
        FieldSpec::int("karma").sortable(),
        FieldSpec::string("content"),
    ],
};

pub static TEAM: FilterSchema = FilterSchema {
    resource: "team members",
    fields: &[
        FieldSpec::int("id"),
        FieldSpec::int("user_id"),
        FieldSpec::string("username"),
        FieldSpec::int("level"),
        FieldSpec::timestamp("date_added"),
        FieldSpec::string("position"),
    ],
};

pub static RATINGS: FilterSchema = FilterSchema {
    resource: "ratings",
    fields: &[
        FieldSpec::int("game_id"),
        FieldSpec::int("mod_id"),
        FieldSpec::int("rating"),
        FieldSpec::timestamp("date_added").sortable(),
    ],
};

pub static MOD_STATS: FilterSchema = FilterSchema {
    resource: "mod stats",
    fields: &[
        FieldSpec::int("mod_id").sortable(),
        FieldSpec::int("popularity_rank_position").sortable(),
        FieldSpec::int("popularity_rank_total_mods"),
        FieldSpec::int("downloads_total").sortable(),
        FieldSpec::int("subscribers_total").sortable(),
        FieldSpec::int("ratings_positive").sortable(),
        FieldSpec::int("ratings_negative").sortable(),
    ],
};

pub static TAGS: FilterSchema = FilterSchema {
    resource: "tags",
    fields: &[
        FieldSpec::timestamp("date_added").sortable(),
        FieldSpec::string("tag").sortable(),
    ],
};

/// Game tag option groups
pub static TAG_OPTIONS: FilterSchema = FilterSchema {
    resource: "tag options",
    fields: &[
        FieldSpec::string("name").sortable(),
        FieldSpec::string("type"),
        FieldSpec::int("hidden"),
        FieldSpec::int("locked"),
    ],
};

/// Mods a mod depends on
pub static DEPENDENCIES: FilterSchema = FilterSchema {
    resource: "dependencies",
    fields: &[
        FieldSpec::int("mod_id").sortable(),
        FieldSpec::timestamp("date_added").sortable(),
    ],
};

impl Filter {
    pub fn games() -> Self {
        Self::new(&GAMES)
    }

    pub fn mods() -> Self {
        Self::new(&MODS)
    }

    pub fn files() -> Self {
        Self::new(&FILES)
    }

    pub fn users() -> Self {
        Self::new(&USERS)
    }

    pub fn events() -> Self {
        Self::new(&EVENTS)
    }

    pub fn user_events() -> Self {
        Self::new(&USER_EVENTS)
    }

    pub fn comments() -> Self {
        Self::new(&COMMENTS)
    }

    pub fn team() -> Self {
        Self::new(&TEAM)
    }

    pub fn ratings() -> Self {
        Self::new(&RATINGS)
    }

    pub fn mod_stats() -> Self {
        Self::new(&MOD_STATS)
    }

    pub fn tags() -> Self {
        Self::new(&TAGS)
    }

    pub fn tag_options() -> Self {
        Self::new(&TAG_OPTIONS)
    }

    pub fn dependencies() -> Self {
        Self::new(&DEPENDENCIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_schemas_have_unique_field_names() {
        for schema in [
            &GAMES, &MODS, &FILES, &USERS, &EVENTS, &USER_EVENTS, &COMMENTS, &TEAM, &RATINGS,
            &MOD_STATS, &TAGS, &TAG_OPTIONS, &DEPENDENCIES,
        ] {
            let mut seen = HashSet::new();
            for field in schema.fields {
                assert!(seen.insert(field.name), "duplicate '{}' in {}", field.name, schema.resource);
            }
        }
    }
}
