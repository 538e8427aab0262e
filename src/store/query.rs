/// Query engine: filter expressions, sort specifications and projections
///
/// Callers build [`Filters`] and [`SortBy`] per query. Both are compiled
/// against the entity's descriptor table before any record is scanned, so
/// a bad operator, an inapplicable comparison or a mistyped operand fails
/// up front instead of halfway through a bucket.
use crate::error::{CamError, CamResult};
use crate::store::entity::Entity;
use crate::store::field::{FieldDef, FieldRole, FieldValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Boolean combinator over a condition list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl FromStr for Operator {
    type Err = CamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Operator::And),
            "OR" => Ok(Operator::Or),
            _ => Err(CamError::validation("filter operator error")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl Comparison {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Like => "LIKE",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
        }
    }
}

impl FromStr for Comparison {
    type Err = CamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Comparison::Eq),
            "LIKE" => Ok(Comparison::Like),
            ">" => Ok(Comparison::Gt),
            "<" => Ok(Comparison::Lt),
            _ => Err(CamError::validation("condition operator error")),
        }
    }
}

/// One (field, comparison, operand) test
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub comparison: Comparison,
    pub value: FieldValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, comparison: Comparison, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            comparison,
            value: value.into(),
        }
    }

    /// Build a condition from a textual comparison operator
    pub fn parse(field: impl Into<String>, comparison: &str, value: impl Into<FieldValue>) -> CamResult<Self> {
        Ok(Self::new(field, comparison.parse()?, value))
    }
}

/// Filter expression: operator plus ordered conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub operator: Operator,
    pub conditions: Vec<Condition>,
}

impl Filters {
    /// Matches every record
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            operator: Operator::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            operator: Operator::Or,
            conditions,
        }
    }

    pub fn parse(operator: &str, conditions: Vec<Condition>) -> CamResult<Self> {
        Ok(Self {
            operator: operator.parse()?,
            conditions,
        })
    }

    /// Check every condition against the entity's fields.
    ///
    /// Conditions on fields the entity does not have are dropped. A condition
    /// whose operand kind or comparison does not fit its field is rejected.
    pub fn compile<E: Entity>(&self) -> CamResult<CompiledFilter> {
        let mut conditions = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            let Some(def) = E::field(&condition.field) else {
                tracing::debug!(
                    entity = E::NAME,
                    field = %condition.field,
                    "skipping condition on unknown field"
                );
                continue;
            };

            if !def.kind.supports(condition.comparison) {
                return Err(CamError::validation(format!(
                    "condition operator error: {} is not applicable to {} field {}",
                    condition.comparison.as_str(),
                    def.kind,
                    def.name
                )));
            }

            if condition.value.kind() != def.kind {
                return Err(CamError::validation(format!(
                    "condition value type error: {} expects a {} value, got {}",
                    def.name,
                    def.kind,
                    condition.value.kind()
                )));
            }

            conditions.push(CompiledCondition {
                field: def.name,
                comparison: condition.comparison,
                value: condition.value.clone(),
            });
        }

        Ok(CompiledFilter {
            operator: self.operator,
            conditions,
            unconditional: self.conditions.is_empty(),
        })
    }
}

#[derive(Debug, Clone)]
struct CompiledCondition {
    field: &'static str,
    comparison: Comparison,
    value: FieldValue,
}

impl CompiledCondition {
    fn matches<E: Entity>(&self, record: &E) -> bool {
        let Some(actual) = record.value(self.field) else {
            return false;
        };

        match self.comparison {
            Comparison::Eq => actual == self.value,
            Comparison::Like => match (actual.as_text(), self.value.as_text()) {
                (Some(text), Some(pattern)) => like(text, pattern),
                _ => false,
            },
            Comparison::Gt => actual.compare(&self.value) == Some(Ordering::Greater),
            Comparison::Lt => actual.compare(&self.value) == Some(Ordering::Less),
        }
    }
}

/// Filter ready to be evaluated against records of one entity type
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    operator: Operator,
    conditions: Vec<CompiledCondition>,
    unconditional: bool,
}

impl CompiledFilter {
    /// AND stops at the first failing condition, OR at the first match.
    /// When every condition was skipped AND includes and OR excludes.
    pub fn matches<E: Entity>(&self, record: &E) -> bool {
        if self.unconditional {
            return true;
        }

        match self.operator {
            Operator::And => self.conditions.iter().all(|c| c.matches(record)),
            Operator::Or => self.conditions.iter().any(|c| c.matches(record)),
        }
    }
}

/// SQL-style `%` wildcard at either or both ends of `pattern`
pub fn like(value: &str, pattern: &str) -> bool {
    match (pattern.strip_prefix('%'), pattern.strip_suffix('%')) {
        (Some(rest), Some(_)) => value.contains(rest.strip_suffix('%').unwrap_or(rest)),
        (Some(suffix), None) => value.ends_with(suffix),
        (None, Some(prefix)) => value.starts_with(prefix),
        (None, None) => value == pattern,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl FromStr for Direction {
    type Err = CamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(CamError::validation("sort Direction error")),
        }
    }
}

/// Sort field and direction; defaults to ID ascending (scan order)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub direction: Direction,
}

impl Default for SortBy {
    fn default() -> Self {
        Self {
            field: "ID".to_string(),
            direction: Direction::Asc,
        }
    }
}

impl SortBy {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn parse(field: impl Into<String>, direction: &str) -> CamResult<Self> {
        Ok(Self::new(field, direction.parse()?))
    }

    pub fn compile<E: Entity>(&self) -> CamResult<Sorter> {
        let def = E::field(&self.field).ok_or_else(|| {
            CamError::validation(format!(
                "sort field error: {} has no field {}",
                E::NAME,
                self.field
            ))
        })?;

        Ok(Sorter {
            field: def.name,
            direction: self.direction,
        })
    }
}

/// Comparator over one field, applied with a stable sort
#[derive(Debug, Clone, Copy)]
pub struct Sorter {
    field: &'static str,
    direction: Direction,
}

impl Sorter {
    pub fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        let ordering = match (a.value(self.field), b.value(self.field)) {
            (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };

        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Ties keep their incoming order
    pub fn sort<E: Entity>(&self, records: &mut [E]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Field subset copied into list results (ID always included)
#[derive(Debug, Clone)]
pub struct Projection {
    fields: Option<Vec<&'static str>>,
}

impl Projection {
    /// An empty field list keeps whole records
    pub fn compile<E: Entity>(return_fields: &[String]) -> CamResult<Self> {
        if return_fields.is_empty() {
            return Ok(Self { fields: None });
        }

        let fields = resolve_fields::<E>(return_fields)?
            .into_iter()
            .map(|def| def.name)
            .collect();

        Ok(Self {
            fields: Some(fields),
        })
    }

    pub fn apply<E: Entity>(&self, record: E) -> E {
        let Some(fields) = &self.fields else {
            return record;
        };

        let mut projected = E::default();
        projected.set_id(record.id().to_string());
        for field in fields {
            projected.copy_field(&record, field);
        }
        projected
    }
}

/// Look up descriptors for caller-named fields; unknown names are rejected
pub fn resolve_fields<E: Entity>(names: &[String]) -> CamResult<Vec<&'static FieldDef>> {
    names
        .iter()
        .map(|name| {
            E::field(name).ok_or_else(|| {
                CamError::validation(format!("unknown field {} for {}", name, E::NAME))
            })
        })
        .collect()
}

/// Data fields written by insert/update for a `fieldsToSet` list.
/// Empty means every data field; ID and stamps are managed by the engine.
pub fn writable_fields<E: Entity>(names: &[String]) -> CamResult<Vec<&'static FieldDef>> {
    if names.is_empty() {
        return Ok(E::fields().iter().filter(|def| def.is_data()).collect());
    }

    Ok(resolve_fields::<E>(names)?
        .into_iter()
        .filter(|def| def.role == FieldRole::Data)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::field::Check;
    use chrono::{DateTime, Duration, Utc};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        name: String,
        size: i64,
        created: DateTime<Utc>,
    }

    crate::entity! {
        impl Entity for Sample {
            name: "sample",
            bucket: Photos,
            fields {
                name: String as "Name" => Check::MaxLength(100),
                size: i64 as "Size",
            }
            stamps(created)
        }
    }

    fn sample(id: &str, name: &str, size: i64) -> Sample {
        Sample {
            id: id.into(),
            name: name.into(),
            size,
            created: Utc::now(),
        }
    }

    #[test]
    fn test_like_wildcards() {
        assert!(like("hello-world", "%world"));
        assert!(like("hello-world", "hello%"));
        assert!(like("hello-world", "%lo-wo%"));
        assert!(!like("hello-world", "%xyz%"));
        assert!(like("hello-world", "hello-world"));
        assert!(!like("hello-world", "hello"));
        assert!(like("anything", "%"));
        assert!(like("anything", "%%"));
        assert!(like("", "%"));
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!("AND".parse::<Operator>().unwrap(), Operator::And);
        assert_eq!("OR".parse::<Operator>().unwrap(), Operator::Or);
        assert!("and".parse::<Operator>().unwrap_err().is_validation());
        assert!("!=".parse::<Comparison>().unwrap_err().is_validation());
        assert_eq!("LIKE".parse::<Comparison>().unwrap(), Comparison::Like);
        assert!("UP".parse::<Direction>().unwrap_err().is_validation());
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
    }

    #[test]
    fn test_and_or_short_circuit() {
        let record = sample("1", "front-cam", 10);
        let hit = Condition::new("Name", Comparison::Eq, "front-cam");
        let miss = Condition::new("Name", Comparison::Eq, "back-cam");

        let and = Filters::and(vec![hit.clone(), miss.clone()]).compile::<Sample>().unwrap();
        let or = Filters::or(vec![hit, miss]).compile::<Sample>().unwrap();

        assert!(!and.matches(&record));
        assert!(or.matches(&record));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let record = sample("1", "x", 0);
        assert!(Filters::all().compile::<Sample>().unwrap().matches(&record));
        assert!(Filters::or(vec![]).compile::<Sample>().unwrap().matches(&record));
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let record = sample("1", "x", 0);
        let ghost = Condition::new("Color", Comparison::Eq, "red");

        let and = Filters::and(vec![ghost.clone()]).compile::<Sample>().unwrap();
        let or = Filters::or(vec![ghost.clone()]).compile::<Sample>().unwrap();
        assert!(and.matches(&record));
        assert!(!or.matches(&record));

        let mixed = Filters::and(vec![ghost, Condition::new("Size", Comparison::Eq, 0)])
            .compile::<Sample>()
            .unwrap();
        assert!(mixed.matches(&record));
    }

    #[test]
    fn test_numeric_and_timestamp_comparisons() {
        let record = sample("1", "x", 10);

        let gt = Filters::and(vec![Condition::new("Size", Comparison::Gt, 9)]);
        let lt = Filters::and(vec![Condition::new("Size", Comparison::Lt, 10)]);
        assert!(gt.compile::<Sample>().unwrap().matches(&record));
        assert!(!lt.compile::<Sample>().unwrap().matches(&record));

        let before = record.created - Duration::seconds(1);
        let after_before = Filters::and(vec![Condition::new("Created", Comparison::Gt, before)]);
        let exact = Filters::and(vec![Condition::new("Created", Comparison::Eq, record.created)]);
        assert!(after_before.compile::<Sample>().unwrap().matches(&record));
        assert!(exact.compile::<Sample>().unwrap().matches(&record));
    }

    #[test]
    fn test_mismatches_rejected_at_compile() {
        let wrong_type = Filters::and(vec![Condition::new("Size", Comparison::Eq, "ten")]);
        assert!(wrong_type.compile::<Sample>().unwrap_err().is_validation());

        let like_on_number = Filters::and(vec![Condition::new("Size", Comparison::Like, 1)]);
        assert!(like_on_number.compile::<Sample>().unwrap_err().is_validation());

        let gt_on_text = Filters::and(vec![Condition::new("Name", Comparison::Gt, "a")]);
        assert!(gt_on_text.compile::<Sample>().unwrap_err().is_validation());
    }

    #[test]
    fn test_sort_is_stable_both_directions() {
        let mut records = vec![
            sample("a", "b", 2),
            sample("b", "a", 1),
            sample("c", "b", 2),
            sample("d", "c", 3),
        ];

        SortBy::new("Size", Direction::Desc)
            .compile::<Sample>()
            .unwrap()
            .sort(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "a", "c", "b"]);

        SortBy::new("Name", Direction::Asc)
            .compile::<Sample>()
            .unwrap()
            .sort(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let err = SortBy::new("Color", Direction::Asc).compile::<Sample>().unwrap_err();
        assert!(err.is_validation());
        assert!(SortBy::default().compile::<Sample>().is_ok());
    }

    #[test]
    fn test_projection_keeps_id() {
        let record = sample("abc", "front", 12);

        let projection = Projection::compile::<Sample>(&["Size".to_string()]).unwrap();
        let projected = projection.apply(record.clone());
        assert_eq!(projected.id, "abc");
        assert_eq!(projected.size, 12);
        assert_eq!(projected.name, "");

        let whole = Projection::compile::<Sample>(&[]).unwrap().apply(record.clone());
        assert_eq!(whole, record);

        assert!(Projection::compile::<Sample>(&["Color".to_string()]).is_err());
    }

    #[test]
    fn test_writable_fields_ignore_managed_fields() {
        let all: Vec<_> = writable_fields::<Sample>(&[]).unwrap().iter().map(|d| d.name).collect();
        assert_eq!(all, vec!["Name", "Size"]);

        let scoped: Vec<_> = writable_fields::<Sample>(&["ID".into(), "Created".into(), "Size".into()])
            .unwrap()
            .iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(scoped, vec!["Size"]);

        assert!(writable_fields::<Sample>(&["Bogus".into()]).is_err());
    }
}
