//! Flow document sources.
//!
//! A `FlowSource` turns a path into a fully loaded `FlowDocument`. The
//! pipeline only sees documents, so an incremental parser can take the
//! place of `JsonFileSource` without touching filters or output strategies.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, InputError};
use crate::flow::{FieldValue, FlowRecord};

/// Buffer size for reading flow files (64KB).
const BUFFER_SIZE: usize = 65536;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One input file: optional metadata plus the flow list.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub metadata: Option<FieldValue>,
    pub appflows: Vec<AppFlow>,
}

/// Wrapper object around each flow in `appflows`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppFlow {
    pub flow: FlowRecord,
}

/// Source of flow documents.
pub trait FlowSource {
    /// Load one document. Any failure is fatal for the run.
    fn load(&self, path: &Path) -> Result<FlowDocument, Error>;
}

/// Loads JSON flow files, transparently decompressing gzip.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileSource;

impl JsonFileSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse a document from bytes already in memory.
    pub fn parse(path: &Path, data: &[u8]) -> Result<FlowDocument, Error> {
        serde_json::from_slice(data).map_err(|source| {
            Error::Input(InputError::MalformedJson {
                path: path.display().to_string(),
                source,
            })
        })
    }
}

impl FlowSource for JsonFileSource {
    fn load(&self, path: &Path) -> Result<FlowDocument, Error> {
        let is_gzipped = is_gzip_file(path)?;

        let file = open(path)?;
        let reader: Box<dyn Read> = if is_gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let mut data = Vec::new();
        BufReader::with_capacity(BUFFER_SIZE, reader)
            .read_to_end(&mut data)
            .map_err(|source| {
                Error::Input(InputError::Read {
                    path: path.display().to_string(),
                    source,
                })
            })?;

        debug!(
            path = %path.display(),
            bytes = data.len(),
            gzip = is_gzipped,
            "loaded flow file"
        );

        Self::parse(path, &data)
    }
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|source| {
        let path = path.display().to_string();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::Input(InputError::FileNotFound { path })
        } else {
            Error::Input(InputError::Read { path, source })
        }
    })
}

/// Check if a file is gzipped by extension or magic bytes.
fn is_gzip_file(path: &Path) -> Result<bool, Error> {
    if is_gzip_extension(path) {
        return Ok(true);
    }

    let mut file = open(path)?;
    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(_) => Ok(false), // File too short to be gzipped
    }
}

/// Check if a path appears to be a gzip file by extension only.
pub fn is_gzip_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|f| f.to_str())
        .is_some_and(|name| name.to_lowercase().ends_with(".gz"))
}
