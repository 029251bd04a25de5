//! Query filter compiler
//!
//! Turns the flat, loosely-typed listing parameters (`partNumber=...`,
//! `category=["A","B"]`, `startDate=...`) into a [`Predicate`] tree. The tree
//! is compiled once and only translated to SQL inside the store.
//!
//! Compilation never fails. Malformed array literals fall back to a single
//! tag, and unparseable or unpaired dates are dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::RegexBuilder;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::entities::part::Part;

/// Listing parameter names
pub mod param {
    pub const PAGE: &str = "page";
    pub const LIMIT: &str = "limit";
    pub const GLOBAL_SEARCH: &str = "globalSearch";
    pub const PART_NUMBER: &str = "partNumber";
    pub const PART_NAME: &str = "partName";
    pub const DESCRIPTION: &str = "description";
    pub const ALTERNATIVE_PART_NUMBER: &str = "alternativePartNumber";
    pub const CATEGORY: &str = "category";
    pub const SUB_CATEGORY: &str = "subCategory";
    pub const SUPPLIER: &str = "supplier";
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
}

/// Part fields a predicate can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "partNumber")]
    PartNumber,
    #[serde(rename = "partName")]
    PartName,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "subCategory")]
    SubCategory,
    #[serde(rename = "supplier")]
    Supplier,
    #[serde(rename = "alternativePartNumbers")]
    AlternativePartNumbers,
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "childParts.mainPartId")]
    ChildMainPartId,
}

impl Field {
    /// Document key of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::PartNumber => "partNumber",
            Field::PartName => "partName",
            Field::Description => "description",
            Field::Category => "category",
            Field::SubCategory => "subCategory",
            Field::Supplier => "supplier",
            Field::AlternativePartNumbers => "alternativePartNumbers",
            Field::CreatedAt => "createdAt",
            Field::ChildMainPartId => "childParts.mainPartId",
        }
    }

    /// Values of this field on a part, rendered the way the store indexes them
    pub fn values(&self, part: &Part) -> Vec<String> {
        match self {
            Field::Id => vec![part.id.to_string()],
            Field::PartNumber => vec![part.part_number.clone()],
            Field::PartName => vec![part.part_name.clone()],
            Field::Description => vec![part.description.clone()],
            Field::Category => part.category.clone(),
            Field::SubCategory => part.sub_category.clone(),
            Field::Supplier => part.supplier.clone(),
            Field::AlternativePartNumbers => part.alternative_part_numbers.clone(),
            Field::CreatedAt => vec![timestamp_key(&part.created_at)],
            Field::ChildMainPartId => part
                .child_parts
                .iter()
                .filter_map(|c| c.main_part_id.map(|id| id.to_string()))
                .collect(),
        }
    }
}

/// Fields searched by `globalSearch`, in match order
pub const GLOBAL_SEARCH_FIELDS: [Field; 7] = [
    Field::PartNumber,
    Field::PartName,
    Field::Description,
    Field::Category,
    Field::SubCategory,
    Field::Supplier,
    Field::AlternativePartNumbers,
];

const SUBSTRING_PARAMS: [(&str, Field); 4] = [
    (param::PART_NUMBER, Field::PartNumber),
    (param::PART_NAME, Field::PartName),
    (param::DESCRIPTION, Field::Description),
    (param::ALTERNATIVE_PART_NUMBER, Field::AlternativePartNumbers),
];

const TAG_PARAMS: [(&str, Field); 3] = [
    (param::CATEGORY, Field::Category),
    (param::SUB_CATEGORY, Field::SubCategory),
    (param::SUPPLIER, Field::Supplier),
];

/// Structured filter predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    /// Field (or any element of a multi-valued field) equals the value
    Equals { field: Field, value: String },

    /// Field (or any element) matches the regular expression
    Regex {
        field: Field,
        pattern: String,
        #[serde(rename = "caseInsensitive")]
        case_insensitive: bool,
    },

    /// Multi-valued field contains every listed value
    ContainsAll { field: Field, values: Vec<String> },

    /// Multi-valued field contains at least one listed value
    ContainsAny { field: Field, values: Vec<String> },

    /// Field lies within `[from, to]`, both ends inclusive
    RangeClosed {
        field: Field,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    And { args: Vec<Predicate> },

    Or { args: Vec<Predicate> },
}

impl Predicate {
    /// Case-insensitive literal substring match
    pub fn substring(field: Field, term: &str) -> Self {
        Predicate::Regex {
            field,
            pattern: regex::escape(term),
            case_insensitive: true,
        }
    }

    /// Evaluate the predicate against an in-memory part
    ///
    /// Mirrors the SQL translation in the store so results can be checked
    /// without a database.
    pub fn matches(&self, part: &Part) -> bool {
        match self {
            Predicate::Equals { field, value } => field.values(part).iter().any(|v| v == value),
            Predicate::Regex {
                field,
                pattern,
                case_insensitive,
            } => match RegexBuilder::new(pattern)
                .case_insensitive(*case_insensitive)
                .build()
            {
                Ok(re) => field.values(part).iter().any(|v| re.is_match(v)),
                Err(_) => false,
            },
            Predicate::ContainsAll { field, values } => {
                let have = field.values(part);
                values.iter().all(|v| have.contains(v))
            }
            Predicate::ContainsAny { field, values } => {
                let have = field.values(part);
                values.iter().any(|v| have.contains(v))
            }
            Predicate::RangeClosed { field, from, to } => {
                let (lo, hi) = (timestamp_key(from), timestamp_key(to));
                field
                    .values(part)
                    .iter()
                    .any(|v| v.as_str() >= lo.as_str() && v.as_str() <= hi.as_str())
            }
            Predicate::And { args } => args.iter().all(|p| p.matches(part)),
            Predicate::Or { args } => args.iter().any(|p| p.matches(part)),
        }
    }
}

/// Result of compiling listing parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CompiledFilter {
    /// No filter applied, matches every record
    #[default]
    None,
    Predicate(Predicate),
}

impl CompiledFilter {
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            CompiledFilter::None => None,
            CompiledFilter::Predicate(p) => Some(p),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, CompiledFilter::None)
    }

    pub fn matches(&self, part: &Part) -> bool {
        self.predicate().map_or(true, |p| p.matches(part))
    }
}

impl From<Predicate> for CompiledFilter {
    fn from(p: Predicate) -> Self {
        CompiledFilter::Predicate(p)
    }
}

impl Serialize for CompiledFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CompiledFilter::None => serializer.serialize_str("None"),
            CompiledFilter::Predicate(p) => p.serialize(serializer),
        }
    }
}

/// Raw listing parameters, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    values: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs; later pairs win
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (k, v) in pairs {
            params.set(k, v);
        }
        params
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Set a parameter only when a value is present
    pub fn set_opt(&mut self, name: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.set(name, v);
        }
    }

    /// Get a parameter; blank values count as absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// A set-valued filter after coercion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    One(String),
    Many(Vec<String>),
}

/// Coerce a raw set-valued parameter into one tag or a list of tags
///
/// A value starting with `[` is parsed as a JSON array. Non-string elements
/// are kept in their JSON text form. Anything that fails to parse as an
/// array, including a truncated literal like `[A,B`, is used verbatim as a
/// single tag.
pub fn coerce_tags(raw: &str) -> TagValue {
    if raw.trim_start().starts_with('[') {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Array(items)) => {
                let tags = items
                    .into_iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect();
                return TagValue::Many(tags);
            }
            Ok(_) => debug!(raw, "tag filter is not an array, using it as a single tag"),
            Err(e) => debug!(raw, error = %e, "malformed tag array, using it as a single tag"),
        }
    }
    TagValue::One(raw.to_string())
}

fn tag_predicate(field: Field, value: TagValue) -> Option<Predicate> {
    match value {
        TagValue::One(tag) => Some(Predicate::ContainsAny {
            field,
            values: vec![tag],
        }),
        TagValue::Many(tags) if tags.is_empty() => None,
        TagValue::Many(tags) => Some(Predicate::ContainsAll {
            field,
            values: tags,
        }),
    }
}

/// Parse a date bound: RFC 3339, or `YYYY-MM-DD` as midnight UTC
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Fixed-width timestamp text; sorts lexicographically in time order
pub fn timestamp_key(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Compile listing parameters into a filter
pub fn compile(params: &ListParams) -> CompiledFilter {
    if let Some(term) = params.get(param::GLOBAL_SEARCH) {
        let args = GLOBAL_SEARCH_FIELDS
            .iter()
            .map(|f| Predicate::substring(*f, term))
            .collect();
        let filter = CompiledFilter::Predicate(Predicate::Or { args });
        debug!(?filter, "compiled global search");
        return filter;
    }

    let mut clauses = Vec::new();

    for (name, field) in SUBSTRING_PARAMS {
        if let Some(term) = params.get(name) {
            clauses.push(Predicate::substring(field, term));
        }
    }

    for (name, field) in TAG_PARAMS {
        if let Some(raw) = params.get(name) {
            if let Some(p) = tag_predicate(field, coerce_tags(raw)) {
                clauses.push(p);
            }
        }
    }

    if let (Some(start), Some(end)) = (params.get(param::START_DATE), params.get(param::END_DATE)) {
        match (parse_date(start), parse_date(end)) {
            (Some(from), Some(to)) => clauses.push(Predicate::RangeClosed {
                field: Field::CreatedAt,
                from,
                to,
            }),
            _ => debug!(start, end, "ignoring unparseable date range"),
        }
    }

    let filter = match clauses.len() {
        0 => CompiledFilter::None,
        1 => CompiledFilter::Predicate(clauses.remove(0)),
        _ => CompiledFilter::Predicate(Predicate::And { args: clauses }),
    };
    debug!(?filter, "compiled listing filter");
    filter
}
