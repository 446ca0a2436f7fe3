use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use super::reader::is_gzip;
use crate::error::Result;
use crate::graph::{GraphFormat, Namespace, TripleBatch};

/// Graph text output. The file is reopened in append mode for every batch,
/// and each batch is serialized in full before anything is written, so an
/// interrupted run leaves only complete batches behind. With a `.gz` name
/// every write is its own gzip member.
#[derive(Debug)]
pub struct GraphSink {
    path: PathBuf,
    format: GraphFormat,
    compressed: bool,
    bytes_written: u64,
    batches_written: usize,
}

impl GraphSink {
    /// Truncates `path` and writes the format header.
    pub fn create(path: &Path, format: GraphFormat, bindings: &[Namespace]) -> Result<Self> {
        File::create(path)?;
        let mut sink = Self {
            path: path.to_path_buf(),
            format,
            compressed: is_gzip(path),
            bytes_written: 0,
            batches_written: 0,
        };

        let header = format.header(bindings);
        if !header.is_empty() {
            sink.write_block(&header)?;
        }
        Ok(sink)
    }

    /// Serializes and appends one batch. Returns the uncompressed size.
    pub fn append(&mut self, batch: &TripleBatch) -> Result<usize> {
        let text = self.format.serialize(batch)?;
        self.write_block(&text)?;
        self.batches_written += 1;
        Ok(text.len())
    }

    fn write_block(&mut self, text: &str) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        if self.compressed {
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(text.as_bytes())?;
            encoder.finish()?.flush()?;
        } else {
            let mut file = file;
            file.write_all(text.as_bytes())?;
            file.flush()?;
        }
        self.bytes_written += text.len() as u64;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> GraphFormat {
        self.format
    }

    /// Uncompressed bytes written, header included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn batches_written(&self) -> usize {
        self.batches_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::namespace::{ABOX, EMI, STANDARD_BINDINGS};
    use flate2::read::MultiGzDecoder;
    use std::io::Read;

    fn batch(n: usize) -> TripleBatch {
        let mut batch = TripleBatch::new();
        batch.add(
            ABOX.iri(&format!("inRec{n}")),
            &EMI.iri("hasSource"),
            ABOX.iri(&format!("inRec{n}-source")),
        );
        batch
    }

    #[test]
    fn test_gzip_members_concatenate() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.ttl.gz");

        let mut sink = GraphSink::create(&path, GraphFormat::Turtle, &STANDARD_BINDINGS).unwrap();
        sink.append(&batch(0)).unwrap();
        sink.append(&batch(1)).unwrap();

        let mut text = String::new();
        MultiGzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();

        assert!(text.starts_with("@prefix emi:"));
        assert!(text.contains(":inRec0 emi:hasSource :inRec0-source ."));
        assert!(text.ends_with(":inRec1 emi:hasSource :inRec1-source .\n"));
        assert_eq!(text.matches("@prefix emi:").count(), 1);
        assert_eq!(sink.batches_written(), 2);
        assert_eq!(sink.bytes_written(), text.len() as u64);
    }

    #[test]
    fn test_plain_ntriples() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.nt");
        std::fs::write(&path, "stale content\n").unwrap();

        let mut sink = GraphSink::create(&path, GraphFormat::NTriples, &STANDARD_BINDINGS).unwrap();
        sink.append(&batch(7)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "<https://purl.org/emi/abox#inRec7> <https://purl.org/emi#hasSource> \
             <https://purl.org/emi/abox#inRec7-source> .\n"
        );
    }
}
