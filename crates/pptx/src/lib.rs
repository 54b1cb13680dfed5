//! PPTX (Office Open XML) translation and font substitution.
//!
//! A PPTX file is a ZIP container of XML parts. Translation rewrites the
//! text of every slide in place, shrinking fonts where the translation runs
//! wider than the source; font substitution rewrites typefaces across
//! slides, masters and layouts. Every other part is carried over unchanged.

pub mod archive;
pub mod engine;
pub mod fonts;
pub mod orchestrator;
pub mod paragraph;
pub mod parts;
pub mod xml;

#[cfg(test)]
mod test_support;

pub use archive::{Archive, Part};
pub use engine::{DeckEngine, TranslationOutput};
pub use fonts::substitute_fonts;
pub use orchestrator::{Orchestrator, TranslationUnit};
pub use paragraph::{extract_paragraphs, Paragraph, Resize};
pub use parts::{list_slide_parts, list_style_parts, PartKind};
pub use xml::SlideDocument;
