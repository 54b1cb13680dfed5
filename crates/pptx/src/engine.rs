//! Deck-level operations: translation and font substitution.

use deck_core::{
    EngineConfig, Error, FontProgressEvent, Phase, Progress, ProgressEvent, ReflowPolicy, Result,
    Stats, Summary, TranslationOptions, Translator,
};
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::archive::Archive;
use crate::fonts::substitute_fonts;
use crate::orchestrator::{Orchestrator, TranslationUnit};
use crate::paragraph::extract_paragraphs;
use crate::parts::{list_slide_parts, list_style_parts};
use crate::xml::SlideDocument;

/// Result of [`DeckEngine::translate_deck`].
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    /// The rewritten container.
    pub bytes: Vec<u8>,
    pub summary: Summary,
    /// Every translated paragraph, in deck order.
    pub units: Vec<TranslationUnit>,
}

/// Entry point for operations over PPTX container bytes.
#[derive(Debug, Clone, Default)]
pub struct DeckEngine {
    options: TranslationOptions,
    policy: ReflowPolicy,
}

impl DeckEngine {
    /// Create an engine with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            options: config.translation.clone(),
            policy: config.reflow.clone(),
        }
    }

    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_policy(mut self, policy: ReflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    /// Translate every paragraph of every slide.
    ///
    /// Fails with [`Error::NoTextFound`] before any translate call when the
    /// slides carry no text at all.
    pub async fn translate_deck(
        &self,
        bytes: &[u8],
        translator: &dyn Translator,
        progress: &Progress<ProgressEvent>,
        cancel: &CancellationToken,
    ) -> Result<TranslationOutput> {
        let mut archive = Archive::load(bytes)?;
        let slide_paths = list_slide_parts(&archive)?;

        let mut slides = Vec::with_capacity(slide_paths.len());
        let mut total_units = 0;
        for path in slide_paths {
            let mut doc = parse_part(&archive, &path)?;
            let count = extract_paragraphs(&mut doc).len();
            total_units += count;
            slides.push((path, doc, count));
        }

        if total_units == 0 {
            return Err(Error::NoTextFound);
        }

        let slide_count = slides.len();
        let mut stats = Stats::with_total(total_units);
        let mut units = Vec::with_capacity(total_units);
        let orchestrator =
            Orchestrator::new(translator, &self.options, &self.policy, progress, cancel);

        for (index, (path, mut doc, count)) in slides.into_iter().enumerate() {
            info!(
                "Processing slide {}/{} ({} text blocks)",
                index + 1,
                slide_count,
                count
            );
            progress
                .emit(ProgressEvent {
                    index,
                    total: slide_count,
                    phase: Phase::SlideStarted,
                    detail: format!("{} text blocks", count),
                    stats,
                })
                .await;

            if count == 0 {
                continue;
            }

            let mut paragraphs = extract_paragraphs(&mut doc);
            units.extend(orchestrator.translate_all(&mut paragraphs, &mut stats).await?);
            drop(paragraphs);

            archive.set_part(&path, &doc.to_xml()?)?;
        }

        progress
            .emit(ProgressEvent {
                index: slide_count,
                total: slide_count,
                phase: Phase::Packaging,
                detail: format!("{} parts rewritten", archive.modified_parts().len()),
                stats,
            })
            .await;

        let bytes = archive.serialize()?;

        progress
            .emit(ProgressEvent {
                index: slide_count,
                total: slide_count,
                phase: Phase::Done,
                detail: String::new(),
                stats,
            })
            .await;

        Ok(TranslationOutput {
            bytes,
            summary: stats.summary(),
            units,
        })
    }

    /// Set every Latin, East Asian and complex-script typeface in slides,
    /// masters and layouts to `target_font`.
    ///
    /// Running it twice with the same font yields identical bytes.
    pub async fn replace_fonts(
        &self,
        bytes: &[u8],
        target_font: &str,
        progress: &Progress<FontProgressEvent>,
    ) -> Result<Vec<u8>> {
        let target_font = target_font.trim();
        if target_font.is_empty() {
            return Err(Error::Config("target font must not be empty".to_string()));
        }

        let mut archive = Archive::load(bytes)?;
        progress
            .emit(FontProgressEvent::new("Parsing presentation", 10))
            .await;

        let parts = list_style_parts(&archive);
        let total = parts.len();
        for (i, path) in parts.iter().enumerate() {
            progress
                .emit(FontProgressEvent::new(
                    format!("Processing {}", path),
                    percent_of(i, total),
                ))
                .await;

            let mut doc = parse_part(&archive, path)?;
            let changed = substitute_fonts(&mut doc, target_font);
            if changed > 0 {
                debug!("Replaced {} font declarations in {}", changed, path);
                archive.set_part(path, &doc.to_xml()?)?;
            }
        }

        info!(
            "Font replacement touched {} of {} parts",
            archive.modified_parts().len(),
            total
        );

        progress.emit(FontProgressEvent::new("Repackaging", 95)).await;
        let output = archive.serialize()?;
        progress.emit(FontProgressEvent::new("Done", 100)).await;

        Ok(output)
    }
}

fn parse_part(archive: &Archive, path: &str) -> Result<SlideDocument> {
    SlideDocument::parse(&archive.get_part_text(path)?).map_err(|e| match e {
        Error::Xml(msg) => Error::Xml(format!("{}: {}", path, msg)),
        other => other,
    })
}

/// Progress between 10% and 90% for part `i` of `total`.
fn percent_of(i: usize, total: usize) -> u8 {
    if total == 0 {
        return 90;
    }
    (10 + i * 80 / total) as u8
}
