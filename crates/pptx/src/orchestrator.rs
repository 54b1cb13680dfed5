//! Drives the translator over the paragraphs of one part.
//!
//! Paragraphs go out in batches of `concurrency`; a batch is awaited as a
//! whole before the next one starts, with an optional pause in between to
//! stay under provider rate limits. Progress events and stats updates are
//! produced in document order whatever order the calls complete in.

use deck_core::{
    Error, Phase, Progress, ProgressEvent, ReflowPolicy, Result, Stats, TranslationOptions,
    Translator,
};
use futures::future::join_all;
use log::{debug, warn};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::paragraph::{Paragraph, Resize};

/// Outcome of translating one paragraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationUnit {
    /// Position of the paragraph in the whole deck.
    pub index: usize,
    pub source: String,
    pub translated: String,
    /// The translate call failed and the source text was kept.
    pub fell_back: bool,
    /// Font-size change applied to the paragraph, if any.
    #[serde(skip)]
    pub resize: Option<Resize>,
}

/// Translation settings and collaborators for one deck operation.
pub struct Orchestrator<'a> {
    translator: &'a dyn Translator,
    options: &'a TranslationOptions,
    policy: &'a ReflowPolicy,
    progress: &'a Progress<ProgressEvent>,
    cancel: &'a CancellationToken,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        translator: &'a dyn Translator,
        options: &'a TranslationOptions,
        policy: &'a ReflowPolicy,
        progress: &'a Progress<ProgressEvent>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            translator,
            options,
            policy,
            progress,
            cancel,
        }
    }

    /// Translate `paragraphs` in place, updating `stats` as each one finishes.
    ///
    /// A failed translate call never fails the operation: the paragraph keeps
    /// its source text. Only cancellation returns an error.
    pub async fn translate_all(
        &self,
        paragraphs: &mut [Paragraph<'_>],
        stats: &mut Stats,
    ) -> Result<Vec<TranslationUnit>> {
        let batch_size = self.options.batch_size();
        let batch_count = paragraphs.len().div_ceil(batch_size);
        let delay = self.options.inter_batch_delay();
        let mut units = Vec::with_capacity(paragraphs.len());

        for (batch_index, batch) in paragraphs.chunks_mut(batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let sources: Vec<String> = batch.iter().map(|p| p.full_text()).collect();
            let first_index = stats.units_processed;
            for (offset, source) in sources.iter().enumerate() {
                self.emit(first_index + offset, Phase::UnitStarted, source, stats).await;
            }

            let calls = join_all(sources.iter().map(|source| self.translator.translate(source)));
            let results = tokio::select! {
                results = calls => results,
                _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            };

            for ((paragraph, source), result) in batch.iter_mut().zip(sources).zip(results) {
                let index = stats.units_processed;
                let (translated, fell_back) = match result {
                    Ok(text) => (text, false),
                    Err(e) => {
                        warn!(
                            "Failed to translate paragraph {}, keeping original: {}",
                            index + 1,
                            e
                        );
                        (source.clone(), true)
                    }
                };

                stats.record(&source, &translated);
                self.emit(index, Phase::UnitFinished, &translated, stats).await;

                paragraph.apply_translation(&translated);
                let resize = paragraph.reflow(&source, &translated, self.policy);

                units.push(TranslationUnit {
                    index,
                    source,
                    translated,
                    fell_back,
                    resize,
                });
            }

            if batch_index + 1 < batch_count && !delay.is_zero() {
                debug!("Waiting {:?} before next batch", delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                }
            }
        }

        Ok(units)
    }

    async fn emit(&self, index: usize, phase: Phase, detail: &str, stats: &Stats) {
        self.progress
            .emit(ProgressEvent {
                index,
                total: stats.total_units,
                phase,
                detail: detail.to_string(),
                stats: *stats,
            })
            .await;
    }
}
