//! Paragraph extraction, text consolidation and font-size reflow.

use deck_core::ReflowPolicy;
use log::debug;

use crate::xml::{Element, SlideDocument};

/// DrawingML paragraph.
pub const PARAGRAPH: &str = "a:p";
/// DrawingML text run.
pub const RUN: &str = "a:r";
/// Run properties, carrying `sz` in hundredths of a point.
pub const RUN_PROPERTIES: &str = "a:rPr";
/// Text node of a run or field.
pub const TEXT: &str = "a:t";

/// Size attribute on run properties.
const SIZE_ATTR: &str = "sz";
/// Tells the host application to re-measure the text on next open.
const DIRTY_ATTR: &str = "dirty";

/// A font-size change applied to a paragraph's first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resize {
    pub from: u32,
    pub to: u32,
}

/// Mutable view over one `a:p` element.
#[derive(Debug)]
pub struct Paragraph<'a> {
    element: &'a mut Element,
}

/// Paragraphs of a part that carry non-whitespace text, in document order.
///
/// Empty formatting placeholders are skipped so they never cost a
/// translate call.
pub fn extract_paragraphs(doc: &mut SlideDocument) -> Vec<Paragraph<'_>> {
    doc.elements_named_mut(PARAGRAPH)
        .into_iter()
        .filter(|element| has_text(element))
        .map(|element| Paragraph { element })
        .collect()
}

fn has_text(paragraph: &Element) -> bool {
    paragraph
        .descendants_named(TEXT)
        .iter()
        .any(|t| !t.text().trim().is_empty())
}

impl<'a> Paragraph<'a> {
    /// Number of text nodes the paragraph is split into.
    pub fn text_node_count(&self) -> usize {
        self.element.descendants_named(TEXT).len()
    }

    /// Text of every run joined in document order, trimmed.
    ///
    /// A sentence is often split across runs for styling alone, so the
    /// whole paragraph is the unit of translation.
    pub fn full_text(&self) -> String {
        let joined: String = self
            .element
            .descendants_named(TEXT)
            .iter()
            .map(|t| t.text())
            .collect();
        joined.trim().to_string()
    }

    /// Texts of the individual text nodes.
    pub fn run_texts(&self) -> Vec<String> {
        self.element
            .descendants_named(TEXT)
            .iter()
            .map(|t| t.text())
            .collect()
    }

    /// Write `translated` into the first text node and empty the others.
    ///
    /// Run properties are left alone.
    pub fn apply_translation(&mut self, translated: &str) {
        for (i, text) in self.element.descendants_named_mut(TEXT).into_iter().enumerate() {
            text.set_text(if i == 0 { translated } else { "" });
        }
    }

    /// Font size of the first run, if it has run properties.
    pub fn first_run_size(&mut self, policy: &ReflowPolicy) -> Option<u32> {
        let props = self.first_run_properties()?;
        match props.attribute(SIZE_ATTR) {
            Some(sz) => sz.trim().parse().ok(),
            None => Some(policy.default_size),
        }
    }

    /// Shrink the first run's font when `translated` is visually wider than
    /// `original`.
    ///
    /// Runs without `a:rPr` or with an unreadable size are left unchanged.
    pub fn reflow(&mut self, original: &str, translated: &str, policy: &ReflowPolicy) -> Option<Resize> {
        let props = self.first_run_properties()?;
        let current = match props.attribute(SIZE_ATTR) {
            None => policy.default_size,
            Some(sz) => match sz.trim().parse::<u32>() {
                Ok(size) => size,
                Err(_) => {
                    debug!("Skipping resize, unreadable size {:?}", sz);
                    return None;
                }
            },
        };

        let new_size = policy.resize(current, original, translated)?;
        props.set_attribute(SIZE_ATTR, &new_size.to_string());
        props.set_attribute(DIRTY_ATTR, "0");

        debug!(
            "Smart resize: \"{}...\" (ratio {:.2}) resized {} -> {}",
            original.chars().take(10).collect::<String>(),
            policy.ratio(original, translated),
            current,
            new_size
        );

        Some(Resize {
            from: current,
            to: new_size,
        })
    }

    fn first_run_properties(&mut self) -> Option<&mut Element> {
        self.element
            .first_descendant_named_mut(RUN)?
            .first_descendant_named_mut(RUN_PROPERTIES)
    }
}
