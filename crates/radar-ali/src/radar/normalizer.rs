use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const STOP_WORDS: &[&str] = &[
    "as", "os", "da", "de", "do", "das", "dos", "em", "na", "no", "nas", "nos", "para", "por",
    "com", "um", "uma", "ao", "aos", "se", "que", "and", "of", "the", "for", "to", "in",
];

/// Lower-case, strip accents and replace anything non-alphanumeric with a space.
///
/// Text is decomposed first so precomposed and combining-mark spellings fold alike.
fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !matches!(c, '\u{feff}' | '\u{200b}'))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Split free text into match terms, keeping first-occurrence order.
pub fn tokenize(value: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    fold(value)
        .split_whitespace()
        .filter(|token| token.chars().count() > 1 && !STOP_WORDS.contains(token))
        .filter(|token| seen.insert(token.to_string()))
        .map(str::to_string)
        .collect()
}

/// Tokenize several fields as one ordered, de-duplicated term list.
pub fn tokenize_all<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .flat_map(tokenize)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Identifier form used for companies and solutions: `Curso de Vendas` -> `curso-de-vendas`.
pub fn slugify(value: &str) -> String {
    fold(value).split_whitespace().collect::<Vec<_>>().join("-")
}

/// Comparison key for labels such as regional names.
pub fn normalize_label(value: &str) -> String {
    fold(value).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a cell holding several values (`a; b, c | d`) into trimmed non-empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split([';', ',', '|', '\n'])
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_folds_case_accents_and_punctuation() {
        assert_eq!(
            tokenize("Gestão Financeira / Marketing-Digital!"),
            vec!["gestao", "financeira", "marketing", "digital"]
        );
    }

    #[test]
    fn tokenize_drops_stop_words_short_tokens_and_duplicates() {
        assert_eq!(
            tokenize("Controle de custos e controle do estoque"),
            vec!["controle", "custos", "estoque"]
        );
        assert!(tokenize("  ").is_empty());
    }

    #[test]
    fn tokenize_all_keeps_first_occurrence_order_across_fields() {
        let terms = tokenize_all(["marketing digital", "financeiro", "digital"]);
        assert_eq!(terms, vec!["marketing", "digital", "financeiro"]);
    }

    #[test]
    fn slugify_produces_stable_identifiers() {
        assert_eq!(slugify("\u{feff}Curso de  Vendas"), "curso-de-vendas");
        assert_eq!(slugify("Gestão Financeira 2.0"), "gestao-financeira-2-0");
        assert_eq!(slugify("EMP-001"), "emp-001");
    }

    #[test]
    fn decomposed_and_precomposed_spellings_fold_alike() {
        assert_eq!(
            tokenize("Gesta\u{303}o financ\u{327}a"),
            tokenize("Gestão finança")
        );
        assert_eq!(slugify("Gesta\u{303}o Financeira"), "gestao-financeira");
        assert_eq!(normalize_label("Tria\u{302}ngulo"), "triangulo");
    }

    #[test]
    fn normalize_label_matches_regional_variants() {
        assert_eq!(normalize_label("Zona  da Mata"), normalize_label("zona da mata"));
        assert_eq!(normalize_label("Triângulo"), "triangulo");
    }

    #[test]
    fn split_list_accepts_mixed_separators() {
        assert_eq!(
            split_list("Marketing digital; Financeiro,  vendas | "),
            vec!["Marketing digital", "Financeiro", "vendas"]
        );
    }
}
