//! Typeface substitution on run-level font declarations.

use crate::xml::SlideDocument;

/// Font declarations rewritten by substitution: Latin, East Asian and
/// complex-script typefaces.
pub const FONT_ROLES: [&str; 3] = ["a:latin", "a:ea", "a:cs"];

const TYPEFACE_ATTR: &str = "typeface";

/// Point every font declaration of `doc` at `target`.
///
/// Returns how many declarations actually changed; a part already using
/// `target` everywhere reports zero and is left byte-identical.
pub fn substitute_fonts(doc: &mut SlideDocument, target: &str) -> usize {
    let mut changed = 0;
    for role in FONT_ROLES {
        for element in doc.elements_named_mut(role) {
            if element.set_attribute(TYPEFACE_ATTR, target) {
                changed += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = r#"<p:sldMaster><a:defRPr><a:latin typeface="+mn-lt"/><a:ea typeface="MS Gothic"/><a:cs typeface="Arial" pitchFamily="34"/><a:sym typeface="Wingdings"/></a:defRPr><a:rPr><a:latin typeface="Calibri"/></a:rPr></p:sldMaster>"#;

    #[test]
    fn test_every_role_is_rewritten() {
        let mut doc = SlideDocument::parse(PART).unwrap();
        assert_eq!(substitute_fonts(&mut doc, "Noto Sans"), 4);

        let xml = doc.to_xml().unwrap();
        assert_eq!(xml.matches(r#"typeface="Noto Sans""#).count(), 4);
        assert!(xml.contains(r#"<a:cs typeface="Noto Sans" pitchFamily="34"/>"#));
        assert!(xml.contains(r#"<a:sym typeface="Wingdings"/>"#));
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let mut doc = SlideDocument::parse(PART).unwrap();
        substitute_fonts(&mut doc, "Noto Sans");
        let once = doc.to_xml().unwrap();

        let mut again = SlideDocument::parse(&once).unwrap();
        assert_eq!(substitute_fonts(&mut again, "Noto Sans"), 0);
        assert_eq!(again.to_xml().unwrap(), once);
    }

    #[test]
    fn test_part_without_fonts() {
        let mut doc = SlideDocument::parse("<p:sld><a:t>x</a:t></p:sld>").unwrap();
        assert_eq!(substitute_fonts(&mut doc, "Arial"), 0);
    }
}
