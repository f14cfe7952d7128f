//! # JSON Sheet File Store
//!
//! Persists tables to a single JSON file with safety features:
//! - **Atomic saves**: Write to `.tmp`, sync, rename to prevent corruption
//! - **File locking**: Writers serialize on an exclusive OS lock
//! - **Version validation**: Refuse files written by a newer schema
//!
//! ## File Format
//!
//! ```text
//! SheetFile
//! ├── schema_version: "0.1.0"
//! ├── created / modified: ISO-8601 timestamps
//! └── tables: { "Costing": { headers: [...], key_column, rows: [[...], ...] } }
//! ```
//!
//! The lock lives in a sibling `<file>.lock` that records who holds it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use costing_core::schema::costing_schema;
//! use costing_core::store::{JsonFileStore, RecordStore};
//!
//! let mut store = JsonFileStore::new("costings.json");
//! store.ensure_table(&costing_schema())?;
//! let rows = store.read_all_rows("Costing")?;
//! println!("{} costings on file", rows.len());
//! # Ok::<(), costing_core::errors::CostError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CostError, CostResult};
use crate::schema::TableSchema;

use super::{RecordStore, Row, Table};

/// Current schema version for sheet files
pub const SHEET_SCHEMA_VERSION: &str = "0.1.0";

/// How many times a writer polls for the lock before giving up.
const LOCK_ATTEMPTS: u32 = 50;

/// Delay between lock polls.
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);

/// On-disk layout of a sheet file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetFile {
    pub schema_version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub tables: BTreeMap<String, Table>,
}

impl SheetFile {
    pub fn new() -> Self {
        let now = Utc::now();
        SheetFile {
            schema_version: SHEET_SCHEMA_VERSION.to_string(),
            created: now,
            modified: now,
            tables: BTreeMap::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

impl Default for SheetFile {
    fn default() -> Self {
        SheetFile::new()
    }
}

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        LockInfo {
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Exclusive writer lock on a sheet file, released when dropped.
///
/// The `.lock` file itself is never deleted: a writer waiting on the old
/// file handle would otherwise lock a different inode than the next writer.
pub struct SheetLock {
    lock_path: PathBuf,
    file: File,
    pub info: LockInfo,
}

impl SheetLock {
    /// Acquire the lock, polling briefly while another writer holds it.
    ///
    /// # Returns
    ///
    /// * `Ok(SheetLock)` - Lock acquired
    /// * `Err(CostError::FileLocked)` - Still held after all attempts
    pub fn acquire(sheet_path: &Path) -> CostResult<Self> {
        let lock_path = lock_path_for(sheet_path);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CostError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        let mut attempts = 0;
        while file.try_lock_exclusive().is_err() {
            attempts += 1;
            if attempts >= LOCK_ATTEMPTS {
                let holder = read_lock_info(&mut file)
                    .map(|info| format!("pid {} since {}", info.pid, info.locked_at.to_rfc3339()))
                    .unwrap_or_else(|| "another process".to_string());
                return Err(CostError::file_locked(sheet_path.display().to_string(), holder));
            }
            thread::sleep(LOCK_RETRY_DELAY);
        }

        let info = LockInfo::current();
        let lock_json = serde_json::to_string_pretty(&info)?;
        file.set_len(0)
            .and_then(|_| file.write_all(lock_json.as_bytes()))
            .and_then(|_| file.sync_all())
            .map_err(|e| CostError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        tracing::trace!(path = %lock_path.display(), "sheet lock acquired");
        Ok(SheetLock { lock_path, file, info })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for SheetLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Lock holder info, if the lock file has any.
fn read_lock_info(file: &mut File) -> Option<LockInfo> {
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

/// `<file>.<ext>.lock` next to the sheet file
fn lock_path_for(sheet_path: &Path) -> PathBuf {
    with_suffix(sheet_path, "lock")
}

/// `<file>.<ext>.tmp` next to the sheet file
fn tmp_path_for(sheet_path: &Path) -> PathBuf {
    with_suffix(sheet_path, "tmp")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = path
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

/// Save a sheet file with atomic write semantics.
///
/// 1. Serialize to JSON
/// 2. Write to a temporary file (`.tmp`)
/// 3. Sync to disk
/// 4. Rename over the target (atomic on most filesystems)
pub fn save_sheet(sheet: &SheetFile, path: &Path) -> CostResult<()> {
    let json = serde_json::to_string_pretty(sheet)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CostError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| CostError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| CostError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CostError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a sheet file.
///
/// # Returns
///
/// * `Ok(SheetFile)` - Successfully loaded
/// * `Err(CostError::VersionMismatch)` - File version is incompatible
/// * `Err(CostError::SerializationError)` - Invalid JSON
/// * `Err(CostError::FileError)` - I/O error
pub fn load_sheet(path: &Path) -> CostResult<SheetFile> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CostError::file_error("read", path.display().to_string(), e.to_string()))?;

    let sheet: SheetFile = serde_json::from_str(&contents)
        .map_err(|e| CostError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&sheet.schema_version)?;
    Ok(sheet)
}

/// Load a sheet file, or a fresh empty one if it does not exist yet.
fn load_or_new(path: &Path) -> CostResult<SheetFile> {
    match fs::metadata(path) {
        Ok(_) => load_sheet(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(SheetFile::new()),
        Err(e) => Err(CostError::file_error("stat", path.display().to_string(), e.to_string())),
    }
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CostResult<()> {
    let mismatch = || CostError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SHEET_SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SHEET_SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions a newer minor may carry breaking changes
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}

/// Record store backed by one JSON sheet file.
///
/// Every call re-reads the file, so several processes can share it. Writes
/// hold [`SheetLock`] across the whole read-modify-write cycle.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `edit` against the file contents under the writer lock, then save.
    fn modify<T>(&self, edit: impl FnOnce(&mut SheetFile) -> CostResult<T>) -> CostResult<T> {
        let _lock = SheetLock::acquire(&self.path)?;
        let mut sheet = load_or_new(&self.path)?;
        let out = edit(&mut sheet)?;
        sheet.touch();
        save_sheet(&sheet, &self.path)?;
        Ok(out)
    }
}

impl RecordStore for JsonFileStore {
    fn ensure_table(&mut self, schema: &TableSchema) -> CostResult<()> {
        if let Ok(sheet) = load_sheet(&self.path) {
            if sheet.tables.contains_key(&schema.name) {
                return Ok(());
            }
        }
        self.modify(|sheet| {
            if !sheet.tables.contains_key(&schema.name) {
                tracing::info!(table = %schema.name, path = %self.path.display(), "creating table");
                sheet.tables.insert(schema.name.clone(), Table::from_schema(schema));
            }
            Ok(())
        })
    }

    fn read_all_rows(&self, table: &str) -> CostResult<Vec<Row>> {
        let sheet = load_sheet(&self.path)?;
        sheet
            .tables
            .get(table)
            .map(Table::rows)
            .ok_or_else(|| CostError::table_not_found(table))
    }

    fn append_row(&mut self, table: &str, row: Row) -> CostResult<()> {
        self.modify(|sheet| {
            sheet
                .tables
                .get_mut(table)
                .ok_or_else(|| CostError::table_not_found(table))?
                .append(table, row)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::env::temp_dir;

    fn temp_sheet_path(name: &str) -> PathBuf {
        temp_dir().join(format!("wirecost_test_{}_{}.json", name, std::process::id()))
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
        let _ = fs::remove_file(lock_path_for(path));
        let _ = fs::remove_file(tmp_path_for(path));
    }

    fn schema() -> TableSchema {
        TableSchema::new("Costing", &["Costing ID", "Company"]).with_key("Costing ID")
    }

    fn row(id: &str) -> Row {
        let mut row = Row::new();
        row.insert("Costing ID".into(), Value::from(id));
        row.insert("Company".into(), Value::from("Acme"));
        row
    }

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/data/costings.json");
        assert_eq!(lock_path_for(path), Path::new("/data/costings.json.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/data/costings.json.tmp"));
        assert_eq!(lock_path_for(Path::new("/data/sheet")), Path::new("/data/sheet.lock"));
    }

    #[test]
    fn test_append_and_read_back() {
        let path = temp_sheet_path("append");
        cleanup(&path);

        let mut store = JsonFileStore::new(&path);
        store.ensure_table(&schema()).unwrap();
        store.append_row("Costing", row("CO-0001")).unwrap();
        store.append_row("Costing", row("CO-0002")).unwrap();

        // A second handle sees the same file
        let other = JsonFileStore::new(&path);
        let rows = other.read_all_rows("Costing").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Costing ID"], "CO-0002");

        cleanup(&path);
    }

    #[test]
    fn test_duplicate_key_leaves_file_untouched() {
        let path = temp_sheet_path("duplicate");
        cleanup(&path);

        let mut store = JsonFileStore::new(&path);
        store.ensure_table(&schema()).unwrap();
        store.append_row("Costing", row("CO-0001")).unwrap();
        let err = store.append_row("Costing", row("CO-0001")).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_KEY");
        assert_eq!(store.read_all_rows("Costing").unwrap().len(), 1);

        cleanup(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_sheet_path("atomic");
        cleanup(&path);

        save_sheet(&SheetFile::new(), &path).unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());

        cleanup(&path);
    }

    #[test]
    fn test_missing_file_reads_as_error() {
        let store = JsonFileStore::new(temp_sheet_path("missing_never_created"));
        assert!(matches!(
            store.read_all_rows("Costing"),
            Err(CostError::FileError { .. })
        ));
    }

    #[test]
    fn test_append_to_missing_table() {
        let path = temp_sheet_path("no_table");
        cleanup(&path);

        let mut store = JsonFileStore::new(&path);
        assert_eq!(
            store.append_row("Costing", row("CO-0001")),
            Err(CostError::table_not_found("Costing"))
        );

        cleanup(&path);
    }

    #[test]
    fn test_lock_released_on_drop() {
        let path = temp_sheet_path("lock");
        cleanup(&path);

        let lock = SheetLock::acquire(&path).unwrap();
        assert_eq!(lock.info.pid, std::process::id());
        assert!(lock.lock_path().exists());
        drop(lock);

        // Reacquire immediately
        let again = SheetLock::acquire(&path);
        assert!(again.is_ok());
        drop(again);

        cleanup(&path);
    }

    #[test]
    fn test_rejects_newer_schema() {
        let path = temp_sheet_path("version");
        cleanup(&path);

        let mut sheet = SheetFile::new();
        sheet.schema_version = "0.9.0".to_string();
        save_sheet(&sheet, &path).unwrap();
        assert!(matches!(load_sheet(&path), Err(CostError::VersionMismatch { .. })));

        cleanup(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SHEET_SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
