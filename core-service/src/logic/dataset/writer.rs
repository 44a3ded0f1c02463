use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::record::{SensorRecord, CANONICAL_HEADER};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("schema mismatch in {path}: expected header `{expected}`, found `{found}`")]
    SchemaMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("malformed row {row}: {message}")]
    MalformedRow { row: u64, message: String },
}

/// Append-only CSV data store.
///
/// Each `append` opens the file, writes one encoded row with a single
/// `write_all` and closes it again. No in-process locking.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Open the store, creating the file with the canonical header if absent.
    ///
    /// An existing file with a different header is rejected.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(header_line().as_bytes())?;
                log::info!("Created data store {} with canonical header", path.display());
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                check_header(&path)?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self { path })
    }

    /// Open an existing store for reading; the file must exist.
    pub fn existing(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("data store not found: {}", path.display()),
            )));
        }
        check_header(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row.
    pub fn append(&self, record: &SensorRecord) -> Result<(), StoreError> {
        let row = encode_row(record)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        // Recreated underneath us: the header goes out with the row
        if file.metadata()?.len() == 0 {
            let mut buf = header_line().into_bytes();
            buf.extend_from_slice(&row);
            file.write_all(&buf)?;
        } else {
            file.write_all(&row)?;
        }

        Ok(())
    }

    /// Load every row.
    ///
    /// A single malformed cell fails the whole load. Repeated canonical
    /// header lines are skipped: two writers recovering a recreated file at
    /// the same moment may both emit one.
    pub fn load_all(&self) -> Result<Vec<SensorRecord>, StoreError> {
        check_header(&self.path)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let malformed = |e: csv::Error| StoreError::MalformedRow {
                row: idx as u64 + 1,
                message: e.to_string(),
            };

            let row = result.map_err(malformed)?;
            if is_header_row(&row) {
                log::warn!("Skipping repeated header at row {} of {}", idx + 1, self.path.display());
                continue;
            }
            records.push(row.deserialize::<SensorRecord>(Some(&headers)).map_err(malformed)?);
        }

        log::debug!("Loaded {} rows from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Number of data rows (header lines excluded)
    pub fn row_count(&self) -> Result<usize, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let mut count = 0;
        for result in reader.records() {
            if !is_header_row(&result?) {
                count += 1;
            }
        }
        Ok(count)
    }
}

fn is_header_row(row: &csv::StringRecord) -> bool {
    row.iter().eq(CANONICAL_HEADER.iter().copied())
}

pub fn header_line() -> String {
    format!("{}\n", CANONICAL_HEADER.join(","))
}

fn encode_row(record: &SensorRecord) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.serialize(record)?;

    writer
        .into_inner()
        .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
}

fn check_header(path: &Path) -> Result<(), StoreError> {
    let mut first = String::new();
    BufReader::new(File::open(path)?).read_line(&mut first)?;
    let found = first.trim_end_matches(['\r', '\n']);

    // Empty file (e.g. touched by an operator): header is written on first append
    if found.is_empty() {
        return Ok(());
    }

    let expected = CANONICAL_HEADER.join(",");
    if found != expected {
        return Err(StoreError::SchemaMismatch {
            path: path.to_path_buf(),
            expected,
            found: found.to_string(),
        });
    }

    Ok(())
}
