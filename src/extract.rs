//! Whole-corpus pipeline: key document, partitions, figures, comics.

use std::sync::LazyLock;

use mcp_types::Figure;
use regex::Regex;
use tracing::{debug, info};

use crate::anomaly::Anomalies;
use crate::config::CorpusConfig;
use crate::error::Result;
use crate::graph::{ComicIndex, GraphBuilder};
use crate::normalize::clean_text;
use crate::resolve::TitleKey;
use crate::scanner::Corpus;
use crate::segment::{self, SegmentContext, SegmentWarning};

// "KL'RT [Skrull]" → "Skrull"
static RE_RACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?P<race>[^\]]+)\]").unwrap());

/// Everything one extraction run produces.
#[derive(Debug)]
pub struct Extraction {
    /// In partition order; `id` is the position in this list.
    pub figures: Vec<Figure>,
    pub comics: ComicIndex,
    pub anomalies: Anomalies,
    pub warnings: Vec<SegmentWarning>,
}

/// Run the full pipeline over a loaded corpus.
pub fn extract(corpus: &Corpus, config: &CorpusConfig) -> Result<Extraction> {
    let key_file = config.file_name(&config.key_document);
    let key = TitleKey::from_key_document(
        &key_file,
        corpus.document(&config.key_document)?,
        &config.title_overrides,
    )?;

    let ctx = SegmentContext { corpus, config };
    let mut figures = Vec::new();
    let mut comics = ComicIndex::new();
    let mut anomalies = Anomalies::new();
    let mut warnings = Vec::new();

    {
        let mut builder = GraphBuilder::new(&mut comics, &mut anomalies, &key);
        for partition in &config.partitions {
            let text = corpus.document(&partition.document)?;
            let segmentation = segment::segment(partition, text, &ctx)?;
            warnings.extend(segmentation.warnings);

            for block in segmentation.blocks {
                let id = figures.len();
                let (name, chronolist) = split_name(block.name, block.chronolist);
                let race = RE_RACE
                    .captures(&name)
                    .map(|c| c["race"].to_string())
                    .unwrap_or_default();
                debug!(id, %name, "figure");

                let search = builder.add_figure(id, &name, &chronolist);
                figures.push(Figure {
                    id,
                    name,
                    race,
                    search,
                    link: block.link,
                    dimension: partition.dimension.clone(),
                    chronolist,
                });
            }
        }
    }

    info!(
        figures = figures.len(),
        comics = comics.len(),
        occurrences = comics.occurrence_count(),
        anomalies = anomalies.len(),
        warnings = warnings.len(),
        "extraction finished"
    );

    Ok(Extraction {
        figures,
        comics,
        anomalies,
        warnings,
    })
}

/// Layouts without a separate name carry it as the first line of the list.
fn split_name(name: Option<String>, chronolist: String) -> (String, String) {
    if let Some(name) = name {
        return (name, chronolist);
    }
    match chronolist.to_ascii_lowercase().find("<br>") {
        Some(br) => (
            clean_text(&chronolist[..br]),
            chronolist[br + "<br>".len()..].to_string(),
        ),
        None => (clean_text(&chronolist), String::new()),
    }
}

impl Extraction {
    /// Comic abbreviations in listing order.
    pub fn comic_listing(&self) -> Vec<&str> {
        let mut list: Vec<&str> = self.comics.abbreviations().collect();
        crate::listing::sort_comics(&mut list);
        list
    }

    pub fn figure(&self, name: &str) -> Option<&Figure> {
        self.figures.iter().find(|f| f.name == name)
    }
}
