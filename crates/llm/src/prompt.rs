//! System prompt for presentation translation.

use deck_core::GlossaryItem;

const BASE_SYSTEM_PROMPT: &str = "You are a professional presentation translator.
Translate the text provided by the user to the target language.

CRITICAL RULES:
1. Maintain the original meaning accurately.
2. KEEP IT CONCISE. The output length should be as close to the original length as possible to strictly preserve the slide layout.
3. If the target language typically uses more space, try to use shorter synonyms or abbreviations where professional.
4. Do not add any explanations, just return the translated text.
5. Do not add markdown formatting unless requested.
6. DO NOT TRANSLATE SYMBOLS OR PUNCTUATION. Keep all punctuation marks, bullet points, numbers, and special symbols (e.g., !, ?, ., :, -, \u{2022}, \u{a9}, \u{ae}, \u{2122}, /) EXACTLY as they appear in the original text. Only translate words.";

/// Build the system prompt for `target_language`, appending one rule per
/// glossary entry. Entries with a blank term or translation are skipped.
pub fn build_system_prompt(target_language: &str, glossary: &[GlossaryItem]) -> String {
    let mut prompt = format!("{}\nTarget Language: {}", BASE_SYSTEM_PROMPT, target_language);

    let rules: Vec<String> = glossary
        .iter()
        .filter(|item| !item.term.trim().is_empty() && !item.translation.trim().is_empty())
        .map(|item| format!("- \"{}\" MUST be translated as \"{}\"", item.term, item.translation))
        .collect();

    if !rules.is_empty() {
        prompt.push_str("\n\nTERMINOLOGY GLOSSARY (STRICTLY FOLLOW THESE RULES):\n");
        prompt.push_str("You MUST use the specific translations defined below for the following terms:");
        for rule in rules {
            prompt.push('\n');
            prompt.push_str(&rule);
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(term: &str, translation: &str) -> GlossaryItem {
        GlossaryItem {
            term: term.to_string(),
            translation: translation.to_string(),
        }
    }

    #[test]
    fn test_prompt_names_target_language() {
        let prompt = build_system_prompt("Japanese", &[]);
        assert!(prompt.starts_with("You are a professional presentation translator."));
        assert!(prompt.ends_with("\nTarget Language: Japanese"));
        assert!(!prompt.contains("GLOSSARY"));
    }

    #[test]
    fn test_glossary_rules_skip_blank_entries() {
        let prompt = build_system_prompt(
            "German",
            &[item("Deck", "Foliensatz"), item("  ", "ignored"), item("Slide", " ")],
        );
        assert!(prompt.contains("TERMINOLOGY GLOSSARY"));
        assert!(prompt.contains("- \"Deck\" MUST be translated as \"Foliensatz\""));
        assert_eq!(prompt.matches("MUST be translated as").count(), 1);
    }

    #[test]
    fn test_all_blank_glossary_adds_no_section() {
        let prompt = build_system_prompt("German", &[item("", "")]);
        assert!(!prompt.contains("GLOSSARY"));
    }
}
