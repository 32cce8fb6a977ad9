use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::CorpusConfig;
use crate::error::{ExtractError, Result};

/// All documents the pipeline needs, loaded into memory.
#[derive(Debug, Default)]
pub struct Corpus {
    documents: HashMap<String, String>,
}

impl Corpus {
    /// Build a corpus directly from in-memory documents (stem → text).
    pub fn from_documents<I, K, V>(docs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            documents: docs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Text of a document by stem.
    pub fn document(&self, name: &str) -> Result<&str> {
        self.documents
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ExtractError::MissingDocument {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Scan the corpus directory and load every configured document.
///
/// Expected layout is flat:
///   {root}/key.php, {root}/a.php ... {root}/z.php, {root}/ultimate.php, ...
///
/// Files that the configuration does not mention are ignored.
pub fn scan_corpus(root: &Path, config: &CorpusConfig) -> Result<Corpus> {
    // stem → path for every file carrying the configured extension
    let mut available: HashMap<String, PathBuf> = HashMap::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if let Some(stem) = file_name.strip_suffix(config.file_extension.as_str()) {
            available.insert(stem.to_string(), path.to_path_buf());
        }
    }

    let mut documents = HashMap::new();
    for name in config.documents() {
        if documents.contains_key(name) {
            continue;
        }
        let path = available
            .get(name)
            .ok_or_else(|| ExtractError::MissingDocument {
                name: config.file_name(name),
            })?;
        let bytes = std::fs::read(path).map_err(|e| ExtractError::io(path, e))?;
        debug!(document = name, bytes = bytes.len(), "loaded");
        documents.insert(name.to_string(), decode(bytes));
    }

    Ok(Corpus { documents })
}

/// The site serves ISO-8859-1; accept UTF-8 for re-saved copies.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}
