//! Word lists and patterns used by the ATS analyzer.

use std::sync::OnceLock;

use regex::Regex;

/// First-person pronouns. Resumes should be written without them.
pub const FIRST_PERSON_PRONOUNS: &[&str] = &[
    "eu", "me", "mim", "comigo", "meu", "minha", "meus", "minhas",
];

/// Spelled-out numbers that should be written as digits.
/// "um"/"uma" are left out: they double as the indefinite article.
pub const NUMBER_WORDS: &[&str] = &[
    "dois", "duas", "três", "tres", "quatro", "cinco", "seis", "sete", "oito", "nove", "dez",
];

/// Verbs that signal a measurable result.
pub const ACHIEVEMENT_VERBS: &[&str] = &["aumentou", "reduziu", "gerou", "melhorou", "otimizou"];

fn word_alternation(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("static word list compiles")
}

pub fn pronoun_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| word_alternation(FIRST_PERSON_PRONOUNS))
}

pub fn number_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| word_alternation(NUMBER_WORDS))
}

/// `%`, a currency sign, or one of the achievement verbs.
pub fn achievement_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let verbs = ACHIEVEMENT_VERBS.join("|");
        Regex::new(&format!(r"(?i)%|R\$|\$|€|£|\b(?:{verbs})\b"))
            .expect("static achievement pattern compiles")
    })
}
