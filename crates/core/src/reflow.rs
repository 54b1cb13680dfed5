//! Font-size reflow heuristic for translated text.
//!
//! Translated text rarely has the visual length of its source. Instead of
//! measuring glyphs, each character gets a width weight and the paragraph's
//! font size is reduced in fixed steps when the translation is noticeably
//! wider. Sizes are in hundredths of a point, as stored in DrawingML `sz`.

use serde::{Deserialize, Serialize};

/// Tunable numbers for the reflow heuristic.
///
/// `Default` reproduces the shipped behaviour exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflowPolicy {
    /// Weight of CJK ideographs, CJK punctuation and fullwidth forms.
    pub wide_weight: f64,
    /// Weight of ASCII uppercase letters.
    pub uppercase_weight: f64,
    /// Weight of every other character.
    pub default_weight: f64,
    /// Ratios above this shrink by `moderate_step`.
    pub moderate_ratio: f64,
    /// Ratios above this shrink by `large_step`.
    pub large_ratio: f64,
    pub moderate_step: u32,
    pub large_step: u32,
    /// Smallest size a shrink may produce.
    pub min_size: u32,
    /// Size assumed when a run has no `sz` attribute.
    pub default_size: u32,
}

impl Default for ReflowPolicy {
    fn default() -> Self {
        Self {
            wide_weight: 2.0,
            uppercase_weight: 1.2,
            default_weight: 1.0,
            moderate_ratio: 1.1,
            large_ratio: 1.25,
            moderate_step: 200,
            large_step: 400,
            min_size: 800,
            default_size: 1800,
        }
    }
}

impl ReflowPolicy {
    /// Estimated horizontal space taken by `text`.
    pub fn visual_width(&self, text: &str) -> f64 {
        text.chars().map(|c| self.char_weight(c)).sum()
    }

    fn char_weight(&self, c: char) -> f64 {
        if is_wide(c) {
            self.wide_weight
        } else if c.is_ascii_uppercase() {
            self.uppercase_weight
        } else {
            self.default_weight
        }
    }

    /// Width of `translated` relative to `original`.
    ///
    /// An original narrower than one unit counts as one.
    pub fn ratio(&self, original: &str, translated: &str) -> f64 {
        self.visual_width(translated) / self.visual_width(original).max(1.0)
    }

    /// The size a run of `current` should take for the given width ratio.
    ///
    /// Never returns more than `current`.
    pub fn shrink(&self, current: u32, ratio: f64) -> u32 {
        let step = if ratio > self.large_ratio {
            self.large_step
        } else if ratio > self.moderate_ratio {
            self.moderate_step
        } else {
            return current;
        };

        current.saturating_sub(step).max(self.min_size).min(current)
    }

    /// New size for a run when `original` is replaced by `translated`, or
    /// `None` when the size should stay.
    pub fn resize(&self, current: u32, original: &str, translated: &str) -> Option<u32> {
        let new_size = self.shrink(current, self.ratio(original, translated));
        (new_size < current).then_some(new_size)
    }
}

/// Visual width under the default policy.
pub fn visual_width(text: &str) -> f64 {
    ReflowPolicy::default().visual_width(text)
}

fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'     // CJK Unified Ideographs
        | '\u{3000}'..='\u{303F}'   // CJK Symbols and Punctuation
        | '\u{FF00}'..='\u{FFEF}'   // Halfwidth and Fullwidth Forms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_width_weights() {
        assert!((visual_width("Hello world") - 11.2).abs() < 1e-9);
        assert!((visual_width("HELLO") - 6.0).abs() < 1e-9);
        assert_eq!(visual_width("你好"), 4.0);
        assert_eq!(visual_width("，"), 2.0);
        assert_eq!(visual_width("。"), 2.0);
        assert_eq!(visual_width("é1 "), 3.0);
        assert_eq!(visual_width(""), 0.0);
    }

    #[test]
    fn test_ratio_treats_empty_original_as_one() {
        let policy = ReflowPolicy::default();
        assert_eq!(policy.ratio("", "abc"), 3.0);
        assert_eq!(policy.ratio("abcd", "ab"), 0.5);
    }

    #[test]
    fn test_shrink_thresholds() {
        let policy = ReflowPolicy::default();
        assert_eq!(policy.shrink(1800, 1.0), 1800);
        assert_eq!(policy.shrink(1800, 1.1), 1800);
        assert_eq!(policy.shrink(1800, 1.11), 1600);
        assert_eq!(policy.shrink(1800, 1.25), 1600);
        assert_eq!(policy.shrink(1800, 1.26), 1400);
        assert_eq!(policy.shrink(1800, 3.0), 1400);
    }

    #[test]
    fn test_shrink_clamps_at_floor() {
        let policy = ReflowPolicy::default();
        assert_eq!(policy.shrink(1000, 2.0), 800);
        assert_eq!(policy.shrink(900, 1.2), 800);
        assert_eq!(policy.shrink(800, 2.0), 800);
    }

    #[test]
    fn test_shrink_never_grows_small_fonts() {
        let policy = ReflowPolicy::default();
        assert_eq!(policy.shrink(600, 2.0), 600);
        assert_eq!(policy.resize(600, "ab", "abcdefgh"), None);
    }

    #[test]
    fn test_resize_english_to_longer_text() {
        let policy = ReflowPolicy::default();
        // 5 -> 13 width units
        assert_eq!(policy.resize(1800, "hello", "hello friends"), Some(1400));
        // 10 -> 12 width units
        assert_eq!(policy.resize(2400, "abcdefghij", "abcdefghijkl"), Some(2200));
        // 10 -> 11 width units
        assert_eq!(policy.resize(2400, "abcdefghij", "abcdefghijk"), None);
    }

    #[test]
    fn test_policy_deserializes_partial_override() {
        let policy: ReflowPolicy = serde_json::from_str(r#"{"min_size": 1000}"#).unwrap();
        assert_eq!(policy.min_size, 1000);
        assert_eq!(policy.large_step, 400);
        assert_eq!(policy.shrink(1200, 2.0), 1000);
    }
}
