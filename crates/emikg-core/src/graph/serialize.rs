//! Batch serialization. The prefix header is written once per file; every
//! batch block after it is serialized by `oxttl` so that the header followed
//! by any number of blocks parses as one document.

use std::collections::HashMap;
use std::io;

use oxrdf::{Subject, Triple};
use oxttl::{NTriplesSerializer, TurtleSerializer};
use serde::{Deserialize, Serialize};

use super::batch::TripleBatch;
use super::namespace::Namespace;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphFormat {
    Turtle,
    #[serde(rename = "ntriples")]
    NTriples,
}

impl GraphFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Turtle => "turtle",
            Self::NTriples => "ntriples",
        }
    }

    /// Fixed prefix block written once before the first batch.
    #[must_use]
    pub fn header(&self, bindings: &[Namespace]) -> String {
        match self {
            Self::Turtle => {
                let mut out: String = bindings
                    .iter()
                    .map(|ns| format!("@prefix {}: <{}> .\n", ns.prefix, ns.base))
                    .collect();
                out.push('\n');
                out
            }
            Self::NTriples => String::new(),
        }
    }

    /// One batch block, without prefix declarations.
    pub fn serialize(&self, batch: &TripleBatch) -> Result<String> {
        let bytes = match self {
            Self::Turtle => write_turtle(batch)?,
            Self::NTriples => write_ntriples(batch)?,
        };
        let text = String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(match self {
            Self::Turtle => without_prefix_block(&text).to_string(),
            Self::NTriples => text,
        })
    }
}

impl std::fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(Self::Turtle),
            "ntriples" | "nt" | "n-triples" => Ok(Self::NTriples),
            other => Err(format!("unknown graph format: {other}")),
        }
    }
}

fn write_ntriples(batch: &TripleBatch) -> io::Result<Vec<u8>> {
    let mut writer = NTriplesSerializer::new().for_writer(Vec::new());
    for triple in batch.iter() {
        writer.serialize_triple(triple)?;
    }
    Ok(writer.finish())
}

/// Subjects are emitted in first-seen order with all their triples together,
/// so the serializer can group them into one `;`-separated statement.
fn write_turtle(batch: &TripleBatch) -> Result<Vec<u8>> {
    let mut serializer = TurtleSerializer::new();
    for ns in batch.bindings() {
        serializer = serializer.with_prefix(ns.prefix, ns.base)?;
    }

    let mut writer = serializer.for_writer(Vec::new());
    for triple in grouped_by_subject(batch) {
        writer.serialize_triple(triple)?;
    }
    Ok(writer.finish()?)
}

fn grouped_by_subject(batch: &TripleBatch) -> Vec<&Triple> {
    let mut slots: HashMap<&Subject, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Triple>> = Vec::new();
    for triple in batch.iter() {
        let next = groups.len();
        let slot = *slots.entry(&triple.subject).or_insert(next);
        if slot == next {
            groups.push(Vec::new());
        }
        groups[slot].push(triple);
    }
    groups.into_iter().flatten().collect()
}

/// Drops the prefix declarations the serializer opens with; the file header
/// already carries them.
fn without_prefix_block(text: &str) -> &str {
    let mut rest = text;
    while rest.starts_with("@prefix ") || rest.starts_with("PREFIX ") {
        rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
    }
    rest.trim_start_matches('\n')
}
