//! Domain types shared by the deck engine and its consumers.

use serde::{Deserialize, Serialize};

/// The format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Detected only so it can be rejected.
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
            return Some(Self::Ppt);
        }

        None
    }
}

/// Running character and paragraph counters for one translation.
///
/// Counters only ever grow. Characters are counted as Unicode scalar values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Characters of source text sent for translation.
    pub original_chars: usize,
    /// Characters of text written back into the deck.
    pub translated_chars: usize,
    /// Paragraphs finished so far, including fallbacks.
    pub units_processed: usize,
    /// Paragraphs in the whole deck.
    pub total_units: usize,
}

impl Stats {
    /// Create counters for a deck with `total_units` paragraphs.
    pub fn with_total(total_units: usize) -> Self {
        Self {
            total_units,
            ..Self::default()
        }
    }

    /// Account for one finished paragraph.
    pub fn record(&mut self, original: &str, translated: &str) {
        self.original_chars += original.chars().count();
        self.translated_chars += translated.chars().count();
        self.units_processed += 1;
    }

    /// The final character summary.
    pub fn summary(&self) -> Summary {
        Summary {
            original_chars: self.original_chars,
            translated_chars: self.translated_chars,
        }
    }
}

/// Character totals returned with a translated deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub original_chars: usize,
    pub translated_chars: usize,
}

/// What a progress event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// A slide is about to be processed; detail names its text block count.
    SlideStarted,
    /// A paragraph is about to be translated; detail is its source text.
    UnitStarted,
    /// A paragraph is done; detail is the text written back.
    UnitFinished,
    /// All slides are done and the container is being rebuilt.
    Packaging,
    /// The output container is ready.
    Done,
}

/// One event of the translation progress stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Paragraph index for unit events, slide index for slide events.
    pub index: usize,
    /// Paragraph count for unit events, slide count for slide events.
    pub total: usize,
    pub phase: Phase,
    pub detail: String,
    pub stats: Stats,
}

/// One event of the font substitution progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontProgressEvent {
    pub message: String,
    /// Completion from 0 to 100.
    pub percent: u8,
}

impl FontProgressEvent {
    pub fn new(message: impl Into<String>, percent: u8) -> Self {
        Self {
            message: message.into(),
            percent,
        }
    }
}
