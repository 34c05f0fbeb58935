//! Query builder for filtering, sorting and paginating list endpoints
//!
//! A [`Filter`] is bound to the allow-list of one resource (see [`fields`]).
//! Every builder call checks the field against that list and the value
//! against the field's declared kind, so misuse fails here rather than as a
//! 400 from the server:
//!
//! ```rust
//! use modio::filter::{Filter, SortDirection};
//!
//! # fn example() -> modio::Result<()> {
//! let filter = Filter::mods()
//!     .like("name", "*texture*")?
//!     .greater_than("date_added", 1_600_000_000)?
//!     .sort("downloads", SortDirection::Descending)?
//!     .limit(20)?;
//!
//! assert_eq!(filter.encode().get("name-lk"), Some("*texture*"));
//! # Ok(())
//! # }
//! ```

pub mod fields;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::{Result, ValidationError};
use crate::objects::Pagination;

/// Largest page size the server accepts
pub const MAX_LIMIT: u32 = 100;

/// Declared type of a filterable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    String,
    /// Unix timestamp; accepts integers and `DateTime<Utc>`
    Timestamp,
    /// Bit set stored in an integer column
    Flags,
    Boolean,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Integer => "integer",
            FieldKind::String => "string",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Flags => "flag set",
            FieldKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// One entry of a resource allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub filterable: bool,
    pub sortable: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            filterable: true,
            sortable: false,
        }
    }

    pub const fn int(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub const fn flags(name: &'static str) -> Self {
        Self::new(name, FieldKind::Flags)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// A sort key that is not a column (e.g. `popular` on mods)
    pub const fn sort_only(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            filterable: false,
            sortable: true,
        }
    }

    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// Allow-list of the fields a list endpoint understands
#[derive(Debug, PartialEq, Eq)]
pub struct FilterSchema {
    pub resource: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FilterSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A value handed to a filter operation
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Str(String),
    Timestamp(DateTime<Utc>),
    Flags(u64),
    Bool(bool),
}

impl FilterValue {
    fn describe(&self) -> String {
        match self {
            FilterValue::Int(v) => format!("integer {}", v),
            FilterValue::Str(v) => format!("string {:?}", v),
            FilterValue::Timestamp(v) => format!("timestamp {}", v),
            FilterValue::Flags(v) => format!("flag set {:#b}", v),
            FilterValue::Bool(v) => format!("boolean {}", v),
        }
    }

    fn fits(&self, kind: FieldKind) -> bool {
        match (kind, self) {
            (FieldKind::Integer, FilterValue::Int(_)) => true,
            (FieldKind::String, FilterValue::Str(_)) => true,
            (FieldKind::Timestamp, FilterValue::Timestamp(_)) => true,
            (FieldKind::Timestamp, FilterValue::Int(v)) => *v >= 0,
            (FieldKind::Flags, FilterValue::Flags(_)) => true,
            (FieldKind::Flags, FilterValue::Int(v)) => *v >= 0,
            (FieldKind::Boolean, FilterValue::Bool(_)) => true,
            _ => false,
        }
    }

    fn encode(&self) -> String {
        match self {
            FilterValue::Int(v) => v.to_string(),
            FilterValue::Str(v) => v.clone(),
            FilterValue::Timestamp(v) => v.timestamp().to_string(),
            FilterValue::Flags(v) => v.to_string(),
            FilterValue::Bool(v) => v.to_string(),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Int(value.into())
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Int(value.into())
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Str(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Str(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// Comparison applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    Like,
    NotLike,
    In,
    NotIn,
    Min,
    Max,
    GreaterThan,
    SmallerThan,
    BitwiseAnd,
}

impl Operator {
    /// Suffix appended to the field name in the query string
    pub fn suffix(self) -> &'static str {
        match self {
            Operator::Equals => "",
            Operator::NotEquals => "-not",
            Operator::Like => "-lk",
            Operator::NotLike => "-not-lk",
            Operator::In => "-in",
            Operator::NotIn => "-not-in",
            Operator::Min => "-min",
            Operator::Max => "-max",
            Operator::GreaterThan => "-gt",
            Operator::SmallerThan => "-st",
            Operator::BitwiseAnd => "-bitwise-and",
        }
    }

    fn accepts(self, kind: FieldKind) -> bool {
        match self {
            Operator::Equals | Operator::NotEquals => true,
            Operator::Like | Operator::NotLike => kind == FieldKind::String,
            Operator::In | Operator::NotIn => matches!(
                kind,
                FieldKind::Integer | FieldKind::String | FieldKind::Timestamp
            ),
            Operator::Min | Operator::Max | Operator::GreaterThan | Operator::SmallerThan => {
                matches!(kind, FieldKind::Integer | FieldKind::Timestamp)
            }
            Operator::BitwiseAnd => kind == FieldKind::Flags,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
struct Constraint {
    operator: Operator,
    value: String,
}

/// Canonical, ordered key/value pairs ready to be appended to a URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedQuery(Vec<(String, String)>);

impl EncodedQuery {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form-urlencoded rendering, e.g. `id-in=1%2C2&_limit=10`
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<'a> IntoIterator for &'a EncodedQuery {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Filtering, sorting and pagination for one list request
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    schema: &'static FilterSchema,
    constraints: BTreeMap<&'static str, Vec<Constraint>>,
    text: Option<String>,
    sort: Option<(&'static str, SortDirection)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl Filter {
    pub fn new(schema: &'static FilterSchema) -> Self {
        Self {
            schema,
            constraints: BTreeMap::new(),
            text: None,
            sort: None,
            limit: None,
            offset: None,
        }
    }

    pub fn schema(&self) -> &'static FilterSchema {
        self.schema
    }

    /// Rows where `field` equals `value`
    pub fn equals(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::Equals, value.into())
    }

    pub fn not_equals(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::NotEquals, value.into())
    }

    /// SQL `LIKE`; `*` is the wildcard
    pub fn like(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::Like, value.into())
    }

    pub fn not_like(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::NotLike, value.into())
    }

    /// Rows where `field` is one of `values`
    pub fn values_in<I, V>(self, field: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.push_set(field, Operator::In, values)
    }

    pub fn values_not_in<I, V>(self, field: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        self.push_set(field, Operator::NotIn, values)
    }

    /// Greater than or equal
    pub fn min(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::Min, value.into())
    }

    /// Smaller than or equal
    pub fn max(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::Max, value.into())
    }

    pub fn greater_than(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::GreaterThan, value.into())
    }

    pub fn smaller_than(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::SmallerThan, value.into())
    }

    /// Rows whose bit column has every bit of `value` set
    pub fn bitwise(self, field: &str, value: impl Into<FilterValue>) -> Result<Self> {
        self.push(field, Operator::BitwiseAnd, value.into())
    }

    /// Full-text search on the resource's name column
    pub fn text(mut self, query: impl Into<String>) -> Self {
        self.text = Some(query.into());
        self
    }

    /// Sort by a sortable field, replacing any previous sort
    pub fn sort(mut self, field: &str, direction: SortDirection) -> Result<Self> {
        let spec = self.lookup(field)?;
        if !spec.sortable {
            return Err(ValidationError::InvalidFilterField {
                resource: self.schema.resource,
                field: field.to_string(),
                reason: "field is not sortable".to_string(),
            }
            .into());
        }
        self.sort = Some((spec.name, direction));
        Ok(self)
    }

    pub fn limit(mut self, limit: u32) -> Result<Self> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ValidationError::InvalidLimit {
                value: limit,
                max: MAX_LIMIT,
            }
            .into());
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Same filter moved to the page after `pagination`, `None` on the last page
    pub fn page_after(&self, pagination: &Pagination) -> Option<Self> {
        pagination.next().map(|offset| {
            let mut next = self.clone();
            next.offset = Some(offset);
            if next.limit.is_none() && pagination.limit > 0 {
                next.limit = Some(pagination.limit.min(MAX_LIMIT));
            }
            next
        })
    }

    /// Canonical query pairs: constraints by field name, then `_q`, `_sort`,
    /// `_limit` and `_offset`
    pub fn encode(&self) -> EncodedQuery {
        let mut pairs = Vec::new();

        for (field, constraints) in &self.constraints {
            for constraint in constraints {
                pairs.push((
                    format!("{}{}", field, constraint.operator.suffix()),
                    constraint.value.clone(),
                ));
            }
        }

        if let Some(text) = &self.text {
            pairs.push(("_q".to_string(), text.clone()));
        }

        if let Some((field, direction)) = self.sort {
            let value = match direction {
                SortDirection::Ascending => field.to_string(),
                SortDirection::Descending => format!("-{}", field),
            };
            pairs.push(("_sort".to_string(), value));
        }

        if let Some(limit) = self.limit {
            pairs.push(("_limit".to_string(), limit.to_string()));
        }

        if let Some(offset) = self.offset {
            pairs.push(("_offset".to_string(), offset.to_string()));
        }

        EncodedQuery(pairs)
    }

    fn lookup(&self, field: &str) -> Result<&'static FieldSpec> {
        self.schema.field(field).ok_or_else(|| {
            ValidationError::InvalidFilterField {
                resource: self.schema.resource,
                field: field.to_string(),
                reason: "unknown field".to_string(),
            }
            .into()
        })
    }

    fn checked_field(&self, field: &str, operator: Operator) -> Result<&'static FieldSpec> {
        let spec = self.lookup(field)?;

        if !spec.filterable {
            return Err(ValidationError::InvalidFilterField {
                resource: self.schema.resource,
                field: field.to_string(),
                reason: "field can only be used for sorting".to_string(),
            }
            .into());
        }

        if !operator.accepts(spec.kind) {
            return Err(ValidationError::InvalidFilterField {
                resource: self.schema.resource,
                field: field.to_string(),
                reason: format!("operator '{}' is not supported on {} fields", operator.suffix(), spec.kind),
            }
            .into());
        }

        Ok(spec)
    }

    fn checked_value(spec: &FieldSpec, value: &FilterValue) -> Result<String> {
        if !value.fits(spec.kind) {
            return Err(ValidationError::InvalidFilterValue {
                field: spec.name.to_string(),
                expected: spec.kind.to_string(),
                found: value.describe(),
            }
            .into());
        }
        Ok(value.encode())
    }

    fn push(mut self, field: &str, operator: Operator, value: FilterValue) -> Result<Self> {
        let spec = self.checked_field(field, operator)?;
        let value = Self::checked_value(spec, &value)?;
        self.constraints
            .entry(spec.name)
            .or_default()
            .push(Constraint { operator, value });
        Ok(self)
    }

    fn push_set<I, V>(mut self, field: &str, operator: Operator, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let spec = self.checked_field(field, operator)?;
        let encoded = values
            .into_iter()
            .map(|v| Self::checked_value(spec, &v.into()))
            .collect::<Result<Vec<_>>>()?;

        if encoded.is_empty() {
            return Err(ValidationError::InvalidFilterValue {
                field: spec.name.to_string(),
                expected: format!("at least one {}", spec.kind),
                found: "an empty set".to_string(),
            }
            .into());
        }

        self.constraints.entry(spec.name).or_default().push(Constraint {
            operator,
            value: encoded.join(","),
        });
        Ok(self)
    }
}
