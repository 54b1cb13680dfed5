//! Selection and ordering of the XML parts an operation works on.

use deck_core::{Error, Result};
use log::debug;

use crate::archive::Archive;

/// Kind of a text-bearing part, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PartKind {
    Slide,
    Master,
    Layout,
}

impl PartKind {
    /// Classify a part name, ignoring case.
    pub fn classify(path: &str) -> Option<Self> {
        let lower = path.to_lowercase();
        if !lower.ends_with(".xml") || lower.contains("_rels") {
            return None;
        }

        if lower.contains("ppt/slides/slide")
            && !lower.contains("master")
            && !lower.contains("layout")
        {
            Some(Self::Slide)
        } else if lower.contains("ppt/slidemasters/slidemaster")
            || lower.contains("ppt/masters/slidemaster")
        {
            Some(Self::Master)
        } else if lower.contains("ppt/slidelayouts/slidelayout")
            || lower.contains("ppt/layouts/slidelayout")
        {
            Some(Self::Layout)
        } else {
            None
        }
    }
}

/// Slide parts in slide-number order.
pub fn list_slide_parts(archive: &Archive) -> Result<Vec<String>> {
    let slides = select(archive, |kind| kind == PartKind::Slide);
    if slides.is_empty() {
        let names: Vec<&str> = archive.part_names().collect();
        debug!("No slide parts among: {:?}", names);
        return Err(Error::NoSlidesFound);
    }
    Ok(slides)
}

/// Slide, master and layout parts; slides first, each group in number order.
pub fn list_style_parts(archive: &Archive) -> Vec<String> {
    select(archive, |_| true)
}

fn select(archive: &Archive, keep: impl Fn(PartKind) -> bool) -> Vec<String> {
    let mut selected: Vec<(PartKind, Option<usize>, &str)> = archive
        .part_names()
        .filter_map(|name| {
            let kind = PartKind::classify(name)?;
            keep(kind).then(|| (kind, extract_part_number(name), name))
        })
        .collect();

    selected.sort_by(|a, b| {
        a.0.cmp(&b.0).then_with(|| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb).then_with(|| a.2.cmp(b.2)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.2.cmp(b.2),
        })
    });

    selected.into_iter().map(|(_, _, name)| name.to_string()).collect()
}

/// Extract the trailing number from a part name like "ppt/slides/slide12.xml".
fn extract_part_number(path: &str) -> Option<usize> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let len = file_name.len();
    let stem = match file_name.get(len.saturating_sub(4)..) {
        Some(ext) if ext.eq_ignore_ascii_case(".xml") => &file_name[..len - 4],
        _ => file_name,
    };

    let digits: String = stem.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
