//! Serde helpers for the coercions the API relies on: unix timestamps where
//! 0 means "never", 0/1 integers used as booleans, empty objects used as null,
//! and integer-backed enums and bit sets that must survive new server values.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Unix timestamp as sent by the API
///
/// The raw integer is kept; [`Timestamp::datetime`] returns `None` for 0,
/// which the API uses for "not set".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn is_set(self) -> bool {
        self.0 != 0
    }

    pub fn datetime(self) -> Option<DateTime<Utc>> {
        if !self.is_set() {
            return None;
        }
        Utc.timestamp_opt(self.0, 0).single()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => f.write_str("never"),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<i64>::deserialize(deserializer).map(|raw| Self(raw.unwrap_or(0)))
    }
}

/// Accepts `0`/`1` as well as JSON booleans
pub(crate) fn int_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(value) => value,
        Raw::Int(value) => value != 0,
    })
}

/// `null`, a missing key or `{}` all map to `None`
pub(crate) fn optional_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
    }
}

/// `null` maps to the type's default
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Integer enum with an `Unknown` fallback for values added server-side
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value this version of the library does not know about
            Unknown(i64),
        }

        impl $name {
            pub fn value(self) -> i64 {
                match self {
                    $($name::$variant => $value,)+
                    $name::Unknown(value) => value,
                }
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                <i64 as serde::Deserialize>::deserialize(deserializer).map($name::from)
            }
        }

        impl From<$name> for crate::filter::FilterValue {
            fn from(value: $name) -> Self {
                crate::filter::FilterValue::Int(value.value())
            }
        }
    };
}

/// String enum with an `Other` fallback
macro_rules! str_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value this version of the library does not know about
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $value,)+
                    $name::Other(value) => value,
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                <String as serde::Deserialize>::deserialize(deserializer).map(|s| $name::from(s.as_str()))
            }
        }

        impl From<$name> for crate::filter::FilterValue {
            fn from(value: $name) -> Self {
                crate::filter::FilterValue::Str(value.as_str().to_string())
            }
        }
    };
}

/// Bit set stored in an integer column; unknown bits are preserved
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$fmeta:meta])* const $flag:ident = $value:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(u64);

        impl $name {
            $($(#[$fmeta])* pub const $flag: $name = $name($value);)+

            pub const fn empty() -> Self {
                $name(0)
            }

            pub const fn from_bits(bits: u64) -> Self {
                $name(bits)
            }

            pub const fn bits(self) -> u64 {
                self.0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                <u64 as serde::Deserialize>::deserialize(deserializer).map($name::from_bits)
            }
        }

        impl From<$name> for crate::filter::FilterValue {
            fn from(value: $name) -> Self {
                crate::filter::FilterValue::Flags(value.bits())
            }
        }
    };
}

pub(crate) use {flag_set, int_enum, str_enum};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        when: Timestamp,
        #[serde(deserialize_with = "int_bool")]
        flag: bool,
        #[serde(default, deserialize_with = "optional_object")]
        nested: Option<std::collections::BTreeMap<String, i64>>,
    }

    #[test]
    fn test_zero_timestamp_is_not_set() {
        let sample: Sample = serde_json::from_value(json!({"when": 0, "flag": 1})).unwrap();
        assert_eq!(sample.when.raw(), 0);
        assert!(!sample.when.is_set());
        assert!(sample.when.datetime().is_none());
        assert!(sample.flag);
        assert!(sample.nested.is_none());
    }

    #[test]
    fn test_timestamp_parses_to_datetime() {
        let sample: Sample =
            serde_json::from_value(json!({"when": 1_492_564_103, "flag": false, "nested": {}})).unwrap();
        let datetime = sample.when.datetime().unwrap();
        assert_eq!(datetime.timestamp(), 1_492_564_103);
        assert!(!sample.flag);
        assert!(sample.nested.is_none());
    }

    #[test]
    fn test_null_timestamp_and_populated_object() {
        let sample: Sample =
            serde_json::from_value(json!({"when": null, "flag": 0, "nested": {"a": 1}})).unwrap();
        assert!(!sample.when.is_set());
        assert_eq!(sample.when.to_string(), "never");
        assert_eq!(sample.nested.unwrap()["a"], 1);
        assert_eq!(Timestamp::from_raw(1_492_564_103).to_string(), "2017-04-19 01:08:23");
    }
}
