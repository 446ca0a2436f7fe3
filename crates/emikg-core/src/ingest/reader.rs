use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use flate2::read::MultiGzDecoder;

use super::record::{ColumnSchema, InteractionRecord};
use crate::error::Result;

#[must_use]
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Opens a file for reading, decompressing every gzip member when the name
/// ends in `.gz`.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    if is_gzip(path) {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads interaction records in fixed-size batches. Only the current batch
/// is held in memory.
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    schema: ColumnSchema,
    origin: PathBuf,
    buffer: StringRecord,
    rows_read: usize,
    exhausted: bool,
}

impl RecordReader<Box<dyn Read>> {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_reader(open_input(path)?, path)
    }
}

impl<R: Read> RecordReader<R> {
    /// Tab-separated, no quoting, ragged rows allowed.
    pub fn from_reader(reader: R, origin: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_reader(reader);
        let schema = ColumnSchema::from_headers(reader.headers()?, origin)?;

        Ok(Self {
            reader,
            schema,
            origin: origin.to_path_buf(),
            buffer: StringRecord::new(),
            rows_read: 0,
            exhausted: false,
        })
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Up to `size` records, or `None` once the input is exhausted.
    pub fn next_batch(&mut self, size: usize) -> Result<Option<Vec<InteractionRecord>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut batch = Vec::with_capacity(size.min(4096));
        while batch.len() < size {
            if !self.reader.read_record(&mut self.buffer)? {
                self.exhausted = true;
                break;
            }
            self.rows_read += 1;
            batch.push(self.schema.read(&self.buffer));
        }

        if batch.is_empty() {
            tracing::debug!("Finished reading {} ({} rows)", self.origin.display(), self.rows_read);
            return Ok(None);
        }
        Ok(Some(batch))
    }
}
