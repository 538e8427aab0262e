/// Storage engine for the homecam controller
///
/// Wraps a single-file redb store. Every entity type owns one bucket (a redb
/// table keyed by record ID), and one extra bucket holds configuration values
/// such as the schema-version stamp and the admin credentials.

use crate::error::{CamError, CamResult};
use redb::{ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Data layout revision written to the configuration bucket
pub const SCHEMA_VERSION: u32 = 1;

/// Configuration key holding the schema-version stamp
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Named key/value namespaces within the store file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Devices,
    Locations,
    Photos,
    Videos,
    Audios,
    Requests,
    Configuration,
}

impl Bucket {
    /// Fixed bucket set created at startup
    pub const ALL: [Bucket; 7] = [
        Bucket::Devices,
        Bucket::Locations,
        Bucket::Photos,
        Bucket::Videos,
        Bucket::Audios,
        Bucket::Requests,
        Bucket::Configuration,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Bucket::Devices => "devices",
            Bucket::Locations => "locations",
            Bucket::Photos => "photos",
            Bucket::Videos => "videos",
            Bucket::Audios => "audios",
            Bucket::Requests => "requests",
            Bucket::Configuration => "configuration",
        }
    }

    pub const fn table(self) -> TableDefinition<'static, &'static str, &'static [u8]> {
        TableDefinition::new(self.name())
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to the embedded store
///
/// redb serializes write transactions across the whole file and gives each
/// read transaction a consistent snapshot, so readers never block writers.
pub struct Database {
    inner: redb::Database,
    path: PathBuf,
}

impl Database {
    /// Open or create the store file at `path` (owner-only permissions)
    pub fn open(path: &Path) -> CamResult<Self> {
        create_owner_only(path).map_err(|e| CamError::Storage(redb::Error::Io(e)))?;

        let inner = redb::Database::create(path)?;
        debug!("opened store at {:?}", path);

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    /// Open the store, create the fixed bucket set and stamp the schema version
    pub fn init(path: &Path) -> CamResult<Self> {
        let db = Self::open(path)?;
        db.ensure_buckets(&Bucket::ALL)?;
        db.stamp_schema_version()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create each named bucket if it does not exist yet
    pub fn ensure_buckets(&self, buckets: &[Bucket]) -> CamResult<()> {
        self.with_write_tx(|txn| {
            for bucket in buckets {
                txn.open_table(bucket.table())?;
            }
            Ok(())
        })?;

        info!(
            "buckets ready: {}",
            buckets.iter().map(|b| b.name()).collect::<Vec<_>>().join(", ")
        );
        Ok(())
    }

    /// Write the compiled-in schema version when the stored one is absent or differs.
    /// No data migration is performed.
    pub fn stamp_schema_version(&self) -> CamResult<()> {
        let stored = self.schema_version()?;

        if stored != Some(SCHEMA_VERSION) {
            self.set_config(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_string().as_bytes())?;
            info!(
                "schema version stamped: {:?} -> {}",
                stored, SCHEMA_VERSION
            );
        }

        Ok(())
    }

    /// Schema version currently recorded in the configuration bucket
    pub fn schema_version(&self) -> CamResult<Option<u32>> {
        let Some(raw) = self.get_config(SCHEMA_VERSION_KEY)? else {
            return Ok(None);
        };

        let text = std::str::from_utf8(&raw)
            .map_err(|_| CamError::Internal("schema version stamp is not UTF-8".to_string()))?;
        let version = text.parse().map_err(|_| {
            CamError::Internal(format!("schema version stamp is not an integer: {:?}", text))
        })?;

        Ok(Some(version))
    }

    /// Raw value of a configuration key
    pub fn get_config(&self, key: &str) -> CamResult<Option<Vec<u8>>> {
        self.with_read_tx(|txn| read_value(txn, Bucket::Configuration, key))
    }

    pub fn set_config(&self, key: &str, value: &[u8]) -> CamResult<()> {
        self.with_write_tx(|txn| {
            let mut table = txn.open_table(Bucket::Configuration.table())?;
            table.insert(key, value)?;
            Ok(())
        })
    }

    /// Run `f` inside a read transaction (snapshot of the last commit)
    pub fn with_read_tx<T, F>(&self, f: F) -> CamResult<T>
    where
        F: FnOnce(&ReadTransaction) -> CamResult<T>,
    {
        let txn = self.inner.begin_read()?;
        f(&txn)
    }

    /// Run `f` inside a write transaction: commit on `Ok`, abort on `Err`.
    /// A panic inside `f` drops the transaction, which aborts it.
    pub fn with_write_tx<T, F>(&self, f: F) -> CamResult<T>
    where
        F: FnOnce(&WriteTransaction) -> CamResult<T>,
    {
        let txn = self.inner.begin_write()?;

        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = txn.abort() {
                    warn!("failed to abort write transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }
}

/// Fetch one raw value; a missing bucket reads as absent
pub fn read_value(txn: &ReadTransaction, bucket: Bucket, key: &str) -> CamResult<Option<Vec<u8>>> {
    let table = match txn.open_table(bucket.table()) {
        Ok(table) => table,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let value = table.get(key)?.map(|guard| guard.value().to_vec());
    Ok(value)
}

/// Visit every (key, value) pair of a bucket in ascending key order
pub fn scan_bucket<F>(txn: &ReadTransaction, bucket: Bucket, mut visit: F) -> CamResult<()>
where
    F: FnMut(&str, &[u8]) -> CamResult<()>,
{
    let table = txn.open_table(bucket.table())?;

    for entry in table.iter()? {
        let (key, value) = entry?;
        visit(key.value(), value.value())?;
    }

    Ok(())
}

#[cfg(unix)]
fn create_owner_only(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    if !path.exists() {
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(path)?;
    }

    Ok(())
}

#[cfg(not(unix))]
fn create_owner_only(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
