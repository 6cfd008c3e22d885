//! Component - the typed element of an InfinityDB Item
//!
//! An Item key is a sequence of components. Besides the primitive types
//! (null, boolean, number, string, date) there are three marker types:
//!
//! - [`EntityClass`]: a "table name", uppercase first letter
//! - [`Attribute`]: a "column name", lowercase first letter
//! - [`Index`]: a position inside a list-shaped value
//!
//! EntityClass and Attribute delimit the Tuple segments of an Item.
//!
//! ## Ordering
//!
//! Components are ordered only within a single component type. The server
//! has a fixed inter-type order, but the client does not reproduce it:
//! comparing a string to a number yields `None` from `partial_cmp` and an
//! [`CoreError::Unorderable`] from [`Component::try_cmp`].
//!
//! Markers order by their string form, so an id-based marker
//! (`EntityClass(12)`) sorts lexically among the named ones.

use crate::error::{CoreError, Result};
use crate::token::{encode_string, parse_quoted};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").expect("valid name regex"));

// Only for telling numbers and dates apart
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+-").expect("valid date regex"));

static MARKER_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(EntityClass|Attribute)\((-?[0-9]+)\)$").expect("valid marker id regex")
});

const ENTITY_CLASS_PATTERN: &str = "[A-Z][A-Za-z0-9_.-]*";
const ATTRIBUTE_PATTERN: &str = "[a-z][A-Za-z0-9_.-]*";

/// True if `name` is usable as an EntityClass name.
pub fn is_legal_entity_class_name(name: &str) -> bool {
    NAME_RE.is_match(name) && name.starts_with(|c: char| c.is_ascii_uppercase())
}

/// True if `name` is usable as an Attribute name.
pub fn is_legal_attribute_name(name: &str) -> bool {
    NAME_RE.is_match(name) && name.starts_with(|c: char| c.is_ascii_lowercase())
}

/// How a marker component is identified.
///
/// Name-based and id-based markers never compare equal, even when the
/// server would resolve them to the same entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkerId {
    Named(String),
    ById(i64),
}

macro_rules! marker_component {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $pattern:expr, $legal:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(MarkerId);

        impl $name {
            /// Build from a name, validating the name grammar.
            pub fn new(name: impl Into<String>) -> Result<Self> {
                let name = name.into();
                if !$legal(&name) {
                    return Err(CoreError::IllegalComponentName {
                        kind: $kind,
                        name,
                        pattern: $pattern,
                    });
                }
                Ok(Self(MarkerId::Named(name)))
            }

            /// Build from a numeric id.
            pub fn from_id(id: i64) -> Self {
                Self(MarkerId::ById(id))
            }

            pub fn marker_id(&self) -> &MarkerId {
                &self.0
            }

            /// The name, if this marker is name-based.
            pub fn name(&self) -> Option<&str> {
                match &self.0 {
                    MarkerId::Named(name) => Some(name),
                    MarkerId::ById(_) => None,
                }
            }

            /// The string form used for ordering and on the wire.
            pub fn as_text(&self) -> Cow<'_, str> {
                match &self.0 {
                    MarkerId::Named(name) => Cow::Borrowed(name),
                    MarkerId::ById(id) => Cow::Owned(format!("{}({})", $kind, id)),
                }
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.as_text().cmp(&other.as_text())
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.as_text())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }
    };
}

marker_component!(
    /// The EntityClass component type, conceptually a table name.
    EntityClass,
    "EntityClass",
    ENTITY_CLASS_PATTERN,
    is_legal_entity_class_name
);

marker_component!(
    /// The Attribute component type, conceptually a column name.
    Attribute,
    "Attribute",
    ATTRIBUTE_PATTERN,
    is_legal_attribute_name
);

/// The Index component type: a position in a list stored as Items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index(i64);

impl Index {
    pub fn new(index: i64) -> Self {
        Self(index)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// One typed element of an Item.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    Null,
    Bool(bool),
    Int(i64),
    /// Float and double are not distinguished; both land here.
    Float(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    EntityClass(EntityClass),
    Attribute(Attribute),
    Index(Index),
}

impl Component {
    /// Build an EntityClass component from a name.
    pub fn entity_class(name: impl Into<String>) -> Result<Self> {
        EntityClass::new(name).map(Component::EntityClass)
    }

    /// Build an Attribute component from a name.
    pub fn attribute(name: impl Into<String>) -> Result<Self> {
        Attribute::new(name).map(Component::Attribute)
    }

    pub fn index(index: i64) -> Self {
        Component::Index(Index(index))
    }

    /// True for EntityClass and Attribute, the components that delimit tuples.
    pub fn is_marker(&self) -> bool {
        matches!(self, Component::EntityClass(_) | Component::Attribute(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Component::Null)
    }

    pub fn as_index(&self) -> Option<Index> {
        match self {
            Component::Index(index) => Some(*index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Component::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the component type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Component::Null => "null",
            Component::Bool(_) => "boolean",
            Component::Int(_) => "long",
            Component::Float(_) => "double",
            Component::String(_) => "string",
            Component::DateTime(_) => "date",
            Component::EntityClass(_) => "EntityClass",
            Component::Attribute(_) => "Attribute",
            Component::Index(_) => "Index",
        }
    }

    /// Compare two components of the same type.
    ///
    /// Fails with [`CoreError::Unorderable`] for components of different
    /// types, or for a NaN float.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        self.partial_cmp(other)
            .ok_or_else(|| CoreError::Unorderable {
                left: self.to_string(),
                right: other.to_string(),
            })
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Component::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (String(a), String(b)) => a.partial_cmp(b),
            (DateTime(a), DateTime(b)) => a.partial_cmp(b),
            (EntityClass(a), EntityClass(b)) => a.partial_cmp(b),
            (Attribute(a), Attribute(b)) => a.partial_cmp(b),
            (Index(a), Index(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Null => f.write_str("null"),
            Component::Bool(b) => write!(f, "{b}"),
            Component::Int(i) => write!(f, "{i}"),
            Component::Float(v) => f.write_str(&render_float(*v)),
            Component::String(s) => f.write_str(&encode_string(s)),
            Component::DateTime(dt) => f.write_str(&render_date(dt)),
            Component::EntityClass(ec) => write!(f, "{ec}"),
            Component::Attribute(att) => write!(f, "{att}"),
            Component::Index(index) => write!(f, "{index}"),
        }
    }
}

impl FromStr for Component {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        parse_primitive(s)
    }
}

impl From<bool> for Component {
    fn from(b: bool) -> Self {
        Component::Bool(b)
    }
}

impl From<i64> for Component {
    fn from(i: i64) -> Self {
        Component::Int(i)
    }
}

impl From<i32> for Component {
    fn from(i: i32) -> Self {
        Component::Int(i64::from(i))
    }
}

impl From<f64> for Component {
    fn from(v: f64) -> Self {
        Component::Float(v)
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Self {
        Component::String(s.to_string())
    }
}

impl From<String> for Component {
    fn from(s: String) -> Self {
        Component::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Component {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Component::DateTime(dt)
    }
}

impl From<EntityClass> for Component {
    fn from(ec: EntityClass) -> Self {
        Component::EntityClass(ec)
    }
}

impl From<Attribute> for Component {
    fn from(att: Attribute) -> Self {
        Component::Attribute(att)
    }
}

impl From<Index> for Component {
    fn from(index: Index) -> Self {
        Component::Index(index)
    }
}

/// Render a float so that it always reads back as a float.
pub fn render_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Render a date in ISO-8601 / RFC 3339 form.
pub fn render_date(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parse one token into a component.
///
/// Dispatches on the first character: `true`/`false`/`null` literals,
/// digit or sign for numbers and dates, `[` for an Index, `"` for a
/// string, and a name for an EntityClass (uppercase) or Attribute
/// (lowercase). A number containing `.` is a float; an optional trailing
/// `f` is dropped.
pub fn parse_primitive(text: &str) -> Result<Component> {
    let first = match text.chars().next() {
        Some(c) => c,
        None => return Err(CoreError::malformed(text)),
    };
    match text {
        "true" => return Ok(Component::Bool(true)),
        "false" => return Ok(Component::Bool(false)),
        "null" => return Ok(Component::Null),
        _ => {}
    }

    if first.is_ascii_digit() || first == '+' || first == '-' {
        parse_number_or_date(text)
    } else if first == '[' {
        parse_index(text)
    } else if first == '"' {
        let (content, end) = parse_quoted(text, 0)?.ok_or_else(|| CoreError::malformed(text))?;
        if end != text.len() {
            return Err(CoreError::malformed(text));
        }
        Ok(Component::String(content))
    } else if let Some(caps) = MARKER_ID_RE.captures(text) {
        let id: i64 = caps[2].parse().map_err(|_| CoreError::malformed(text))?;
        Ok(match &caps[1] {
            "EntityClass" => Component::EntityClass(EntityClass::from_id(id)),
            _ => Component::Attribute(Attribute::from_id(id)),
        })
    } else if NAME_RE.is_match(text) {
        let id = MarkerId::Named(text.to_string());
        Ok(if first.is_ascii_uppercase() {
            Component::EntityClass(EntityClass(id))
        } else {
            Component::Attribute(Attribute(id))
        })
    } else {
        Err(CoreError::malformed(text))
    }
}

fn parse_number_or_date(text: &str) -> Result<Component> {
    if DATE_RE.is_match(text) {
        return parse_date(text)
            .map(Component::DateTime)
            .ok_or_else(|| CoreError::malformed(text));
    }
    if text.contains('.') {
        let digits = text.strip_suffix('f').unwrap_or(text);
        return digits
            .parse::<f64>()
            .map(Component::Float)
            .map_err(|_| CoreError::malformed(text));
    }
    text.parse::<i64>()
        .map(Component::Int)
        .map_err(|_| CoreError::malformed(text))
}

fn parse_index(text: &str) -> Result<Component> {
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|inner| {
            let digits = inner.strip_prefix('-').unwrap_or(inner);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        })
        .ok_or_else(|| CoreError::malformed(text))?;
    inner
        .parse::<i64>()
        .map(Component::index)
        .map_err(|_| CoreError::malformed(text))
}

/// Parse an ISO-8601 date.
///
/// Accepts RFC 3339 (`2024-01-15T10:30:00Z`, `...+05:00`), an offset without
/// colon (`...-0800`), a date-time without offset, and a bare date. Values
/// without an offset are taken as UTC.
pub fn parse_date(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt);
    }
    let utc = FixedOffset::east_opt(0)?;
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(utc.from_utc_datetime(&naive));
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
