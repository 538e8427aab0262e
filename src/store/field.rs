/// Typed field values and per-entity field descriptors
use crate::error::{CamError, CamResult};
use crate::store::query::Comparison;
use crate::store::validation;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Value kind of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Integer,
    Timestamp,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Timestamp => "timestamp",
        }
    }

    /// Whether a filter comparison is meaningful for this kind.
    /// Text takes `=` and `LIKE`, numbers and instants take `=`, `>` and `<`.
    pub fn supports(self, comparison: Comparison) -> bool {
        match self {
            FieldKind::Text => matches!(comparison, Comparison::Eq | Comparison::Like),
            FieldKind::Integer | FieldKind::Timestamp => {
                matches!(comparison, Comparison::Eq | Comparison::Gt | Comparison::Lt)
            }
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field value lifted out of a record, or the operand of a filter condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering between two values of the same kind; `None` across kinds
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Convert a JSON operand to the kind a field expects.
    /// Timestamps are RFC 3339 strings.
    pub fn from_json(kind: FieldKind, value: &Value) -> Option<FieldValue> {
        match (kind, value) {
            (FieldKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
            (FieldKind::Integer, Value::Number(n)) => n.as_i64().map(FieldValue::Integer),
            (FieldKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc))),
            _ => None,
        }
    }

    /// Best-effort conversion when there is no descriptor to go by
    pub fn infer(value: &Value) -> FieldValue {
        match value {
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Text(n.to_string()),
            },
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// Rust types that can back a record field
pub trait FieldType {
    const KIND: FieldKind;

    fn to_value(&self) -> FieldValue;
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl FieldType for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }
}

impl FieldType for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn to_value(&self) -> FieldValue {
        FieldValue::Timestamp(*self)
    }
}

/// Constraint run whenever a field is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    None,
    Uuid,
    MaxLength(usize),
}

/// What the engine does with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Storage key, always carried
    Id,
    /// Caller-supplied data
    Data,
    /// Stamped once at insert
    Created,
    /// Stamped at insert and on every update
    Updated,
}

/// Descriptor for one field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub check: Check,
    pub role: FieldRole,
}

impl FieldDef {
    pub const fn id() -> Self {
        Self {
            name: "ID",
            kind: FieldKind::Text,
            check: Check::Uuid,
            role: FieldRole::Id,
        }
    }

    pub const fn data(name: &'static str, kind: FieldKind, check: Check) -> Self {
        Self {
            name,
            kind,
            check,
            role: FieldRole::Data,
        }
    }

    pub const fn created() -> Self {
        Self {
            name: "Created",
            kind: FieldKind::Timestamp,
            check: Check::None,
            role: FieldRole::Created,
        }
    }

    pub const fn updated() -> Self {
        Self {
            name: "Updated",
            kind: FieldKind::Timestamp,
            check: Check::None,
            role: FieldRole::Updated,
        }
    }

    pub fn is_data(&self) -> bool {
        self.role == FieldRole::Data
    }

    /// Run the field's check against a value taken from an `entity` record.
    /// Failures carry codes like `error_maxlength__device___Key`.
    pub fn validate(&self, entity: &str, value: &FieldValue) -> CamResult<()> {
        let Some(text) = value.as_text() else {
            return Ok(());
        };

        let valid = match self.check {
            Check::None => true,
            Check::Uuid => validation::is_uuid(text),
            Check::MaxLength(max) => validation::max_length(text, max).is_ok(),
        };

        if valid {
            return Ok(());
        }

        let code = match self.check {
            Check::Uuid => "uuid",
            _ => "maxlength",
        };
        tracing::debug!(entity, field = self.name, "rejected value: {} check failed", code);

        Err(CamError::validation(format!(
            "error_{}__{}___{}",
            code, entity, self.name
        )))
    }

    /// Typed operand for a JSON condition value aimed at this field
    pub fn parse_json(&self, value: &Value) -> CamResult<FieldValue> {
        FieldValue::from_json(self.kind, value).ok_or_else(|| {
            CamError::validation(format!(
                "condition value type error: {} expects a {} value",
                self.name, self.kind
            ))
        })
    }
}
