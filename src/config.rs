//! Corpus configuration.
//!
//! Every field has a default describing the live chronology site, so an
//! empty (or absent) TOML file is a valid configuration. A file only needs
//! to list what differs, e.g. a mirror with another base URL:
//!
//! ```toml
//! base_url = "https://mirror.example/"
//! file_extension = ".htm"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};
use crate::types::{Dialect, Partition, SubDocument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Prefix for figure links.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Extension of every document file in the corpus directory.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Document holding the abbreviation → title table.
    #[serde(default = "default_key_document")]
    pub key_document: String,

    /// Processed in order; figure ids follow this order.
    #[serde(default = "default_partitions")]
    pub partitions: Vec<Partition>,

    #[serde(default = "default_sub_documents")]
    pub sub_documents: Vec<SubDocument>,

    /// Titles for abbreviations the key document lacks or gets wrong.
    #[serde(default = "default_title_overrides")]
    pub title_overrides: BTreeMap<String, String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            file_extension: default_file_extension(),
            key_document: default_key_document(),
            partitions: default_partitions(),
            sub_documents: default_sub_documents(),
            title_overrides: default_title_overrides(),
        }
    }
}

impl CorpusConfig {
    /// Link to a document, e.g. `http://www.chronologyproject.com/a.php`.
    pub fn document_link(&self, document: &str) -> String {
        format!("{}{}{}", self.base_url, document, self.file_extension)
    }

    /// File name of a document inside the corpus directory.
    pub fn file_name(&self, document: &str) -> String {
        format!("{}{}", document, self.file_extension)
    }

    /// Every document the pipeline reads, key document first.
    pub fn documents(&self) -> Vec<&str> {
        let mut docs = vec![self.key_document.as_str()];
        docs.extend(self.partitions.iter().map(|p| p.document.as_str()));
        docs.extend(self.sub_documents.iter().map(|s| s.document.as_str()));
        docs
    }

    fn validate(&self) -> Result<()> {
        if self.partitions.is_empty() {
            return Err(ExtractError::config("no partitions configured"));
        }
        if let Some(p) = self.partitions.iter().find(|p| p.document.is_empty()) {
            return Err(ExtractError::config(format!(
                "partition with dimension {:?} has an empty document name",
                p.dimension
            )));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://www.chronologyproject.com/".into()
}

fn default_file_extension() -> String {
    ".php".into()
}

fn default_key_document() -> String {
    "key".into()
}

fn default_partitions() -> Vec<Partition> {
    // Per-letter files use the expand/collapse layout
    let mut partitions: Vec<Partition> = ('a'..='z')
        .map(|c| Partition::new(&c.to_string(), Dialect::Expandable, "standard"))
        .collect();
    // Alternate continuities still use the old layout
    partitions.extend([
        Partition::new("killraven", Dialect::Legacy, "Killraven Mythos"),
        Partition::new("newu", Dialect::Legacy, "New Universe"),
        Partition::new("2099", Dialect::Legacy, "2099"),
        Partition::new("ultimate", Dialect::Legacy, "Ultimate Universe"),
        Partition::new("aoa", Dialect::Legacy, "Age of Apocalypse"),
        Partition::new("heroesreborn", Dialect::Legacy, "Heroes Reborn"),
    ]);
    partitions
}

fn default_sub_documents() -> Vec<SubDocument> {
    vec![
        SubDocument::new("CAPTAIN AMERICA Chronology Page", "capa"),
        SubDocument::new("HULK Chronology Page", "hulk"),
        SubDocument::new("IRON MAN Chronology Page", "ironman"),
        SubDocument::new("MR. FANTASTIC Chronology Page", "mrfantastic"),
        SubDocument::new("SCARLET WITCH Chronology Page", "witch"),
        SubDocument::new("SPIDER-MAN Chronology Page", "spidey"),
        SubDocument::new("STORM Chronology Page", "storm"),
        SubDocument::new("SUB-MARINER Chronology Page", "namor"),
    ]
}

fn default_title_overrides() -> BTreeMap<String, String> {
    [
        ("MARVEL MYSTERY COMICS", "MARVEL MYSTERY COMICS"),
        ("US1", "US1"),
        ("UX/FF", "UX/FF"),
        ("MYSTIC COMICS", "MYSTIC COMICS"),
        ("RED RAVEN", "RED RAVEN"),
        ("SUN GIRL", "SUN GIRL"),
        ("W3", "WOLVERINE VOL. 3"),
        ("WORLD OF FANTASY", "WORLD OF FANTASY"),
        ("RINGO KID WESTERN", "RINGO KID WESTERN"),
        ("BATTLETIDE", "BATTLETIDE"),
        ("PPSM", "PPSM"),
        ("GOTG", "GOTG"),
        ("NAMORA COMICS", "NAMORA COMICS"),
        ("N:EA", "N:EA"),
        ("MEKANIX", "MEKANIX"),
        ("KID KOMICS", "KID KOMICS"),
        ("REDEYE", "REDEYE"),
        ("WESTERN GUNFIGHTERS", "WESTERN GUNFIGHTERS"),
        ("G-S KID COLT", "G-S KID COLT"),
        ("MYSTERY TALES", "MYSTERY TALES"),
        ("CIVIL WAR", "CIVIL WAR"),
        ("NFHC", "NICK FURY'S HOWLING COMMANDOS"),
        ("NEW TEEN TITANS", "NEW TEEN TITANS"),
        ("GENE", "GENETIX"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Load configuration from a TOML file, or the defaults when `path` is None.
pub fn load_config(path: Option<&Path>) -> Result<CorpusConfig> {
    let config = match path {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).map_err(|e| ExtractError::io(path, e))?;
            toml::from_str(&text)
                .map_err(|e| ExtractError::config(format!("{}: {e}", path.display())))?
        }
        None => CorpusConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
