/// Generic validated CRUD and listing over one entity bucket
use crate::db::{read_value, scan_bucket, Database};
use crate::error::{CamError, CamResult};
use crate::store::entity::Entity;
use crate::store::field::{FieldDef, FieldValue};
use crate::store::query::{writable_fields, Filters, Projection, SortBy};
use crate::store::validation;
use chrono::{DateTime, Duration, Utc};
use redb::ReadableTable;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// One page of list results plus the number of matches before paging
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<E> {
    pub results: Vec<E>,
    pub total: u64,
}

/// Repository for one entity type
///
/// Holds no record state between calls. Every operation runs in its own
/// read or write transaction.
pub struct Repository<E: Entity> {
    db: Arc<Database>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Store a new record and return its ID.
    ///
    /// Only the data fields named in `fields` are taken from `record` (all of
    /// them when `fields` is empty); the rest keep their default values.
    pub fn insert(&self, record: &E, fields: &[String]) -> CamResult<String> {
        let id = if record.id().is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            record.id().to_string()
        };
        FieldDef::id().validate(E::NAME, &FieldValue::Text(id.clone()))?;

        let scope = writable_fields::<E>(fields)?;
        validate_scope(record, &scope)?;

        let mut stored = E::default();
        stored.set_id(id.clone());
        for def in &scope {
            stored.copy_field(record, def.name);
        }

        let now = Utc::now();
        stored.set_created(now);
        stored.set_updated(now);

        let document = serde_json::to_vec(&stored)?;

        self.db.with_write_tx(|txn| {
            let mut table = txn.open_table(E::BUCKET.table())?;
            if table.get(id.as_str())?.is_some() {
                return Err(CamError::Conflict(format!(
                    "{} with ID {} already exists",
                    E::NAME,
                    id
                )));
            }
            table.insert(id.as_str(), document.as_slice())?;
            Ok(())
        })?;

        debug!(bucket = %E::BUCKET, id = %id, "inserted record");
        Ok(id)
    }

    pub fn get(&self, id: &str) -> CamResult<E> {
        validation::check_uuid(id)?;

        let raw = self
            .db
            .with_read_tx(|txn| read_value(txn, E::BUCKET, id))?
            .ok_or_else(|| not_found::<E>())?;

        Ok(serde_json::from_slice(&raw)?)
    }

    /// Apply the named fields of `record` onto the stored record with the
    /// same ID. Returns the number of rows affected (always 1 on success).
    pub fn update(&self, record: &E, fields: &[String]) -> CamResult<u64> {
        let id = record.id();
        validation::check_uuid(id)?;

        let scope = writable_fields::<E>(fields)?;
        validate_scope(record, &scope)?;

        self.db.with_write_tx(|txn| {
            let mut table = txn.open_table(E::BUCKET.table())?;

            let mut stored: E = match table.get(id)? {
                Some(raw) => serde_json::from_slice(raw.value())?,
                None => return Err(not_found::<E>()),
            };

            for def in &scope {
                stored.copy_field(record, def.name);
            }

            if let Some(previous) = stored.updated() {
                stored.set_updated(next_stamp(previous.max(stored.created())));
            }

            let document = serde_json::to_vec(&stored)?;
            table.insert(id, document.as_slice())?;
            Ok(())
        })?;

        debug!(bucket = %E::BUCKET, id = %id, fields = scope.len(), "updated record");
        Ok(1)
    }

    pub fn delete(&self, id: &str) -> CamResult<u64> {
        validation::check_uuid(id)?;

        self.db.with_write_tx(|txn| {
            let mut table = txn.open_table(E::BUCKET.table())?;
            let removed = table.remove(id)?.is_some();
            if removed {
                Ok(())
            } else {
                Err(not_found::<E>())
            }
        })?;

        debug!(bucket = %E::BUCKET, id = %id, "deleted record");
        Ok(1)
    }

    /// Filtered, sorted and paged listing over a full bucket scan.
    ///
    /// `total` counts every match; the page holds matches whose index lies in
    /// `offset..offset + limit`. Records that fail to decode are logged and
    /// skipped.
    pub fn list(
        &self,
        offset: usize,
        limit: usize,
        filters: &Filters,
        return_fields: &[String],
        sort_by: &SortBy,
    ) -> CamResult<Page<E>> {
        let filter = filters.compile::<E>()?;
        let sorter = sort_by.compile::<E>()?;
        let projection = Projection::compile::<E>(return_fields)?;

        let mut matches: Vec<E> = Vec::new();
        self.db.with_read_tx(|txn| {
            scan_bucket(txn, E::BUCKET, |key, raw| {
                match serde_json::from_slice::<E>(raw) {
                    Ok(record) if filter.matches(&record) => matches.push(record),
                    Ok(_) => {}
                    Err(e) => warn!(bucket = %E::BUCKET, key, "skipping undecodable record: {}", e),
                }
                Ok(())
            })
        })?;

        sorter.sort(&mut matches);
        let total = matches.len() as u64;

        let results = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| projection.apply(record))
            .collect();

        Ok(Page { results, total })
    }
}

fn validate_scope<E: Entity>(record: &E, scope: &[&'static FieldDef]) -> CamResult<()> {
    for def in scope {
        if let Some(value) = record.value(def.name) {
            def.validate(E::NAME, &value)?;
        }
    }
    Ok(())
}

fn not_found<E: Entity>() -> CamError {
    CamError::NotFound(format!("{} not found", E::NAME))
}

/// A stamp strictly later than `previous`, even if the clock has not moved
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}
