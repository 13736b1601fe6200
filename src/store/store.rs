use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::conf::StorageConfig;
use crate::core::RowfileError;

use super::record::{json_type_name, stamp_created, Field, Record};

/// A directory of JSON table files with an in-memory mirror.
///
/// Every table is one `<directory>/<name>.json` file holding a JSON array of
/// records. The store owns the rows; callers only borrow them for reads.
#[derive(Debug)]
pub struct Store {
    directory: PathBuf,
    tables: HashMap<String, Vec<Record>>,
}

/// Result of `load_or_create_table`.
#[derive(Debug, PartialEq)]
pub struct TableLoad {
    pub rows: Vec<Record>,
    pub created: bool,
}

/// Result of `create`.
#[derive(Debug, PartialEq)]
pub enum CreateResult {
    /// The table was not in memory yet. It was initialized empty and the
    /// candidate record was NOT inserted.
    TableCreated,
    /// All constraint checks passed and the stamped record was appended.
    Inserted(Record),
}

impl Store {
    /// Open a store rooted at `config.directory`, creating the directory if
    /// it does not exist, then load every table file in it.
    pub fn open(config: &StorageConfig) -> Result<Self, RowfileError> {
        let directory = std::path::absolute(&config.directory).map_err(|e| {
            RowfileError::IoError(format!(
                "resolving {}: {}",
                config.directory.display(),
                e
            ))
        })?;

        if !directory.is_dir() {
            fs::create_dir_all(&directory).map_err(|e| {
                RowfileError::IoError(format!(
                    "creating directory {}: {}",
                    directory.display(),
                    e
                ))
            })?;
        }

        let mut store = Self {
            directory,
            tables: HashMap::new(),
        };
        store.sync_from_disk()?;

        info!(
            "opened store at {} with {} tables",
            store.directory.display(),
            store.tables.len()
        );

        Ok(store)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Rows of a loaded table, or None if the name is unknown.
    pub fn rows(&self, name: &str) -> Option<&[Record]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Reload every table from its backing file, overwriting the in-memory
    /// rows per table name. Runs after every load-or-create and delete.
    pub fn sync_from_disk(&mut self) -> Result<(), RowfileError> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.directory)
            .map_err(|e| {
                RowfileError::IoError(format!(
                    "reading directory {}: {}",
                    self.directory.display(),
                    e
                ))
            })?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let p = entry.path();
                if p.extension().and_then(|e| e.to_str()) == Some("json") {
                    Some(p)
                } else {
                    None
                }
            })
            .collect();

        entries.sort();

        for path in entries {
            let name = path
                .file_stem()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    RowfileError::IoError(format!("invalid file name: {}", path.display()))
                })?
                .to_string();
            let rows = read_rows(&path)?;
            debug!("synced table '{}' with {} rows", name, rows.len());
            self.tables.insert(name, rows);
        }

        Ok(())
    }

    /// Load a table's rows from disk, writing an empty table file first if
    /// none exists. Either way the whole store is re-synced afterwards.
    pub fn load_or_create_table(&mut self, name: &str) -> Result<TableLoad, RowfileError> {
        let path = self.table_path(name);

        let load = match fs::read_to_string(&path) {
            Ok(data) => TableLoad {
                rows: serde_json::from_str(&data).map_err(|e| {
                    RowfileError::CorruptData(format!("{}: {}", path.display(), e))
                })?,
                created: false,
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&path, "[]").map_err(|e| {
                    RowfileError::IoError(format!("writing {}: {}", path.display(), e))
                })?;
                debug!("created table file {}", path.display());
                TableLoad {
                    rows: Vec::new(),
                    created: true,
                }
            }
            Err(e) => {
                return Err(RowfileError::IoError(format!(
                    "reading {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        self.sync_from_disk()?;

        Ok(load)
    }

    /// Insert a record into a table.
    ///
    /// If the table is not in memory yet this is a first touch: the table is
    /// created empty and the candidate record is dropped, reporting
    /// `TableCreated`. Otherwise the record is stamped, checked against every
    /// constrained field, appended, and the whole table rewritten to disk.
    pub fn create(&mut self, name: &str, record: Record) -> Result<CreateResult, RowfileError> {
        if !self.tables.contains_key(name) {
            self.load_or_create_table(name)?;
            return Ok(CreateResult::TableCreated);
        }

        let mut record = record;
        stamp_created(&mut record);

        let path = self.table_path(name);
        let rows = self
            .tables
            .get_mut(name)
            .ok_or_else(|| RowfileError::TableNotFound(name.to_string()))?;

        check_constraints(&record, rows)?;

        rows.push(record.clone());
        write_table(&path, rows)?;

        Ok(CreateResult::Inserted(record))
    }

    /// Remove every record matching the query (all queried fields equal,
    /// constrained values compared unwrapped), rewrite the file, and re-sync.
    ///
    /// Returns the removed records, one single-record batch per match, in
    /// table order.
    pub fn delete(
        &mut self,
        name: &str,
        query: &Record,
    ) -> Result<Vec<Vec<Record>>, RowfileError> {
        let path = self.table_path(name);
        let rows = self
            .tables
            .get_mut(name)
            .ok_or_else(|| RowfileError::TableNotFound(name.to_string()))?;

        let mut removed: Vec<Vec<Record>> = Vec::new();
        let mut i = 0;
        while i < rows.len() {
            if matches_query(&rows[i], query) {
                removed.push(vec![rows.remove(i)]);
            } else {
                i += 1;
            }
        }

        write_table(&path, rows)?;
        self.sync_from_disk()?;

        Ok(removed)
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.json"))
    }
}

fn read_rows(path: &Path) -> Result<Vec<Record>, RowfileError> {
    let data = fs::read_to_string(path)
        .map_err(|e| RowfileError::IoError(format!("reading {}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| RowfileError::CorruptData(format!("{}: {}", path.display(), e)))
}

fn write_table(path: &Path, rows: &[Record]) -> Result<(), RowfileError> {
    let data = serde_json::to_vec(rows)
        .map_err(|e| RowfileError::CorruptData(format!("serializing {}: {}", path.display(), e)))?;
    fs::write(path, data)
        .map_err(|e| RowfileError::IoError(format!("writing {}: {}", path.display(), e)))
}

/// Check the candidate's constrained fields against the existing rows, in
/// field order. The first violation aborts the whole insert.
fn check_constraints(record: &Record, rows: &[Record]) -> Result<(), RowfileError> {
    for (field, value) in record {
        let Field::Constrained(candidate) = value else {
            continue;
        };

        if candidate.unique.unwrap_or(false) {
            for row in rows {
                if let Some(Field::Constrained(existing)) = row.get(field) {
                    if existing.value == candidate.value {
                        return Err(RowfileError::ConstraintError(format!(
                            "unique value constraint: {} already exists with value {}",
                            field, candidate.value
                        )));
                    }
                }
            }
        }

        if let Some(expected) = &candidate.dtype {
            let actual = json_type_name(&candidate.value);
            if expected != actual {
                return Err(RowfileError::ConstraintError(format!(
                    "type constraint expected {expected}, received {actual} instead"
                )));
            }
        }
    }

    Ok(())
}

fn matches_query(row: &Record, query: &Record) -> bool {
    query
        .iter()
        .all(|(field, wanted)| row.get(field).is_some_and(|actual| actual.value() == wanted.value()))
}
