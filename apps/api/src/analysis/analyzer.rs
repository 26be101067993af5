//! ATS scoring analyzer. A deterministic heuristic scan of a resume.
//!
//! Ten weighted checks, evaluated on every document change:
//!
//! | check                    | weight | passes when                       |
//! |--------------------------|--------|-----------------------------------|
//! | word count               | 10     | total words in [300, 1200]        |
//! | page estimate            | 10     | ceil(words / 400) ≤ 2             |
//! | experience section       | 5      | at least one experience           |
//! | education section        | 5      | at least one education            |
//! | contact info             | 10     | email and phone present           |
//! | linkedin                 | 5      | linkedin present                  |
//! | first-person pronouns    | 10     | none found                        |
//! | quantified achievements  | 10     | ≥ 1 experience with a metric      |
//! | number words             | 5      | none found                        |
//! | hard skills              | 10     | ≥ 5 skills                        |
//!
//! `score = round(100 × Σ passed weights / Σ weights)`.

use serde::{Deserialize, Serialize};

use crate::analysis::lexicon::{achievement_pattern, number_word_pattern, pronoun_pattern};
use crate::models::resume::ResumeDocument;

pub const MIN_WORDS: usize = 300;
pub const MAX_WORDS: usize = 1200;
pub const WORDS_PER_PAGE: usize = 400;
pub const MAX_PAGES: usize = 2;
pub const MIN_HARD_SKILLS: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    WordCount,
    PageEstimate,
    ExperienceSection,
    EducationSection,
    ContactInfo,
    Linkedin,
    FirstPersonPronouns,
    QuantifiedAchievements,
    NumberWords,
    HardSkills,
}

impl CheckId {
    pub const ALL: [CheckId; 10] = [
        CheckId::WordCount,
        CheckId::PageEstimate,
        CheckId::ExperienceSection,
        CheckId::EducationSection,
        CheckId::ContactInfo,
        CheckId::Linkedin,
        CheckId::FirstPersonPronouns,
        CheckId::QuantifiedAchievements,
        CheckId::NumberWords,
        CheckId::HardSkills,
    ];

    pub fn weight(&self) -> u32 {
        match self {
            CheckId::WordCount => 10,
            CheckId::PageEstimate => 10,
            CheckId::ExperienceSection => 5,
            CheckId::EducationSection => 5,
            CheckId::ContactInfo => 10,
            CheckId::Linkedin => 5,
            CheckId::FirstPersonPronouns => 10,
            CheckId::QuantifiedAchievements => 10,
            CheckId::NumberWords => 5,
            CheckId::HardSkills => 10,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckId::WordCount => "Tamanho do conteúdo",
            CheckId::PageEstimate => "Número de páginas",
            CheckId::ExperienceSection => "Seção de experiência",
            CheckId::EducationSection => "Seção de formação",
            CheckId::ContactInfo => "E-mail e telefone",
            CheckId::Linkedin => "LinkedIn",
            CheckId::FirstPersonPronouns => "Pronomes em primeira pessoa",
            CheckId::QuantifiedAchievements => "Conquistas mensuráveis",
            CheckId::NumberWords => "Números por extenso",
            CheckId::HardSkills => "Competências técnicas",
        }
    }
}

/// Outcome of one weighted check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: CheckId,
    pub label: String,
    pub weight: u32,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionPresence {
    pub experience: bool,
    pub education: bool,
    pub skills: bool,
    pub projects: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureDiagnostics {
    pub word_count: usize,
    pub estimated_pages: usize,
    pub sections: SectionPresence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentificationDiagnostics {
    pub has_email: bool,
    pub has_phone: bool,
    pub has_linkedin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VocabularyLevel {
    Alto,
    #[serde(rename = "Médio")]
    Medio,
    Baixo,
}

impl VocabularyLevel {
    fn from_mean_length(mean: f64) -> Self {
        if mean > 5.0 {
            VocabularyLevel::Alto
        } else if mean > 4.0 {
            VocabularyLevel::Medio
        } else {
            VocabularyLevel::Baixo
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalDiagnostics {
    pub pronoun_count: usize,
    pub pronouns_found: Vec<String>,
    pub number_word_count: usize,
    pub number_words_found: Vec<String>,
    pub mean_word_length: f64,
    pub vocabulary_level: VocabularyLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticDiagnostics {
    pub quantified_experiences: usize,
    pub total_experiences: usize,
    pub hard_skill_count: usize,
}

/// Derived quality report. Recomputed on every change, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub score: u32, // 0 – 100
    pub structure: StructureDiagnostics,
    pub identification: IdentificationDiagnostics,
    pub lexical: LexicalDiagnostics,
    pub semantic: SemanticDiagnostics,
    pub checks: Vec<CheckResult>,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
impl AnalysisReport {
    pub fn check(&self, id: CheckId) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.id == id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer
// ────────────────────────────────────────────────────────────────────────────

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn matches_lowercased(pattern: &regex::Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Scores a document. Total: never fails, whatever is missing.
pub fn analyze(document: &ResumeDocument) -> AnalysisReport {
    let personal = &document.personal;

    let descriptions: Vec<&str> = document
        .experience
        .iter()
        .map(|e| e.description.as_str())
        .collect();
    let corpus = std::iter::once(personal.summary.as_str())
        .chain(descriptions.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    // Coarse content-volume proxy: prose + headline + one per skill.
    let words = word_count(&personal.summary)
        + descriptions.iter().map(|d| word_count(d)).sum::<usize>()
        + word_count(&personal.role)
        + document.skills.len();
    let estimated_pages = words.div_ceil(WORDS_PER_PAGE);

    let sections = SectionPresence {
        experience: !document.experience.is_empty(),
        education: !document.education.is_empty(),
        skills: !document.skills.is_empty(),
        projects: !document.projects.is_empty(),
    };

    let identification = IdentificationDiagnostics {
        has_email: present(&personal.email),
        has_phone: present(&personal.phone),
        has_linkedin: present(&personal.linkedin),
    };

    let pronouns_found = matches_lowercased(pronoun_pattern(), &corpus);
    let number_words_found = matches_lowercased(number_word_pattern(), &corpus);

    let tokens: Vec<&str> = corpus.split_whitespace().collect();
    let mean_word_length = if tokens.is_empty() {
        0.0
    } else {
        tokens.iter().map(|t| t.chars().count()).sum::<usize>() as f64 / tokens.len() as f64
    };

    let quantified_experiences = descriptions
        .iter()
        .filter(|d| achievement_pattern().is_match(d))
        .count();

    let lexical = LexicalDiagnostics {
        pronoun_count: pronouns_found.len(),
        pronouns_found,
        number_word_count: number_words_found.len(),
        number_words_found,
        mean_word_length,
        vocabulary_level: VocabularyLevel::from_mean_length(mean_word_length),
    };
    let semantic = SemanticDiagnostics {
        quantified_experiences,
        total_experiences: document.experience.len(),
        hard_skill_count: document.skills.len(),
    };
    let structure = StructureDiagnostics {
        word_count: words,
        estimated_pages,
        sections,
    };

    let checks: Vec<CheckResult> = CheckId::ALL
        .iter()
        .map(|&id| evaluate(id, &structure, &identification, &lexical, &semantic))
        .collect();

    let total_weight: u32 = checks.iter().map(|c| c.weight).sum();
    let passed_weight: u32 = checks.iter().filter(|c| c.passed).map(|c| c.weight).sum();
    let score = if total_weight > 0 {
        (100.0 * passed_weight as f64 / total_weight as f64).round() as u32
    } else {
        0
    };

    let suggestions = checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| suggestion_for(c.id, &structure, &lexical))
        .collect();

    AnalysisReport {
        score,
        structure,
        identification,
        lexical,
        semantic,
        checks,
        suggestions,
    }
}

fn evaluate(
    id: CheckId,
    structure: &StructureDiagnostics,
    identification: &IdentificationDiagnostics,
    lexical: &LexicalDiagnostics,
    semantic: &SemanticDiagnostics,
) -> CheckResult {
    let (passed, detail) = match id {
        CheckId::WordCount => (
            (MIN_WORDS..=MAX_WORDS).contains(&structure.word_count),
            format!(
                "{} palavras (ideal entre {MIN_WORDS} e {MAX_WORDS})",
                structure.word_count
            ),
        ),
        CheckId::PageEstimate => (
            structure.estimated_pages <= MAX_PAGES,
            format!("~{} página(s) estimada(s)", structure.estimated_pages),
        ),
        CheckId::ExperienceSection => (
            structure.sections.experience,
            presence_detail(structure.sections.experience),
        ),
        CheckId::EducationSection => (
            structure.sections.education,
            presence_detail(structure.sections.education),
        ),
        CheckId::ContactInfo => (
            identification.has_email && identification.has_phone,
            format!(
                "e-mail: {}, telefone: {}",
                yes_no(identification.has_email),
                yes_no(identification.has_phone)
            ),
        ),
        CheckId::Linkedin => (
            identification.has_linkedin,
            presence_detail(identification.has_linkedin),
        ),
        CheckId::FirstPersonPronouns => (
            lexical.pronoun_count == 0,
            format!("{} ocorrência(s)", lexical.pronoun_count),
        ),
        CheckId::QuantifiedAchievements => (
            semantic.quantified_experiences >= 1,
            format!(
                "{} de {} experiência(s) com resultados mensuráveis",
                semantic.quantified_experiences, semantic.total_experiences
            ),
        ),
        CheckId::NumberWords => (
            lexical.number_word_count == 0,
            format!("{} ocorrência(s)", lexical.number_word_count),
        ),
        CheckId::HardSkills => (
            semantic.hard_skill_count >= MIN_HARD_SKILLS,
            format!(
                "{} competência(s) (mínimo {MIN_HARD_SKILLS})",
                semantic.hard_skill_count
            ),
        ),
    };

    CheckResult {
        id,
        label: id.label().to_string(),
        weight: id.weight(),
        passed,
        detail,
    }
}

fn presence_detail(present: bool) -> String {
    let label = if present { "presente" } else { "ausente" };
    label.to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "sim"
    } else {
        "não"
    }
}

fn suggestion_for(id: CheckId, structure: &StructureDiagnostics, lexical: &LexicalDiagnostics) -> String {
    match id {
        CheckId::WordCount if structure.word_count < MIN_WORDS => format!(
            "Detalhe mais suas experiências: faltam cerca de {} palavras.",
            MIN_WORDS - structure.word_count
        ),
        CheckId::WordCount => "Resuma o conteúdo: o currículo está longo demais.".to_string(),
        CheckId::PageEstimate => format!("Reduza o currículo para no máximo {MAX_PAGES} páginas."),
        CheckId::ExperienceSection => "Adicione ao menos uma experiência profissional.".to_string(),
        CheckId::EducationSection => "Adicione sua formação acadêmica.".to_string(),
        CheckId::ContactInfo => "Informe e-mail e telefone para contato.".to_string(),
        CheckId::Linkedin => "Inclua o link do seu perfil no LinkedIn.".to_string(),
        CheckId::FirstPersonPronouns => format!(
            "Remova pronomes em primeira pessoa ({}).",
            lexical.pronouns_found.join(", ")
        ),
        CheckId::QuantifiedAchievements => {
            "Quantifique resultados: use %, valores ou verbos como aumentou e reduziu.".to_string()
        }
        CheckId::NumberWords => format!(
            "Escreva números com algarismos ({}).",
            lexical.number_words_found.join(", ")
        ),
        CheckId::HardSkills => format!("Liste ao menos {MIN_HARD_SKILLS} competências técnicas."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Education, Experience};

    fn words(n: usize) -> String {
        vec!["desenvolvimento"; n].join(" ")
    }

    fn complete_document() -> ResumeDocument {
        let mut doc = ResumeDocument::new();
        doc.personal.role = "Engenheira de Software".to_string();
        doc.personal.email = "ana@example.com".to_string();
        doc.personal.phone = "+55 11 99999-0000".to_string();
        doc.personal.linkedin = "linkedin.com/in/ana".to_string();
        doc.personal.summary = words(200);
        doc.add_experience(Experience {
            company: "Acme".to_string(),
            description: format!("{} Reduziu a latência em 40%.", words(150)),
            ..Default::default()
        });
        doc.education.push(Education {
            id: "edu".to_string(),
            institution: "USP".to_string(),
            ..Default::default()
        });
        for skill in ["Rust", "Tokio", "SQL", "Docker", "Kubernetes"] {
            doc.add_skill(skill).unwrap();
        }
        doc
    }

    #[test]
    fn test_empty_document_scores_without_failing() {
        let report = analyze(&ResumeDocument::new());
        assert!(report.score <= 100);
        // pages (10) + pronouns (10) + number words (5) of 80
        assert_eq!(report.score, 31);
        assert_eq!(report.structure.word_count, 0);
        assert_eq!(report.structure.estimated_pages, 0);
        assert_eq!(report.lexical.vocabulary_level, VocabularyLevel::Baixo);
    }

    #[test]
    fn test_weights_sum_to_eighty() {
        let total: u32 = CheckId::ALL.iter().map(|c| c.weight()).sum();
        assert_eq!(total, 80);
        let weights: Vec<u32> = CheckId::ALL.iter().map(|c| c.weight()).collect();
        assert_eq!(weights, vec![10, 10, 5, 5, 10, 5, 10, 10, 5, 10]);
    }

    #[test]
    fn test_complete_document_scores_100() {
        let report = analyze(&complete_document());
        let failed: Vec<_> = report.checks.iter().filter(|c| !c.passed).collect();
        assert!(failed.is_empty(), "failed checks: {failed:?}");
        assert_eq!(report.score, 100);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_word_count_includes_role_and_skills() {
        let mut doc = ResumeDocument::new();
        doc.personal.summary = "um dois".to_string();
        doc.personal.role = "Dev Backend".to_string();
        doc.add_skill("Rust").unwrap();
        doc.add_experience(Experience {
            description: "três palavras aqui".to_string(),
            ..Default::default()
        });
        let report = analyze(&doc);
        assert_eq!(report.structure.word_count, 2 + 3 + 2 + 1);
    }

    #[test]
    fn test_long_document_fails_length_and_pages() {
        let mut doc = complete_document();
        doc.personal.summary = words(1300);
        let report = analyze(&doc);
        assert!(!report.check(CheckId::WordCount).unwrap().passed);
        assert!(!report.check(CheckId::PageEstimate).unwrap().passed);
        assert_eq!(report.score, 75);
    }

    #[test]
    fn test_page_estimate_rounds_up() {
        let mut doc = ResumeDocument::new();
        doc.personal.summary = words(401);
        assert_eq!(analyze(&doc).structure.estimated_pages, 2);
        doc.personal.summary = words(801);
        assert_eq!(analyze(&doc).structure.estimated_pages, 3);
    }

    #[test]
    fn test_pronouns_and_number_words_are_penalized() {
        let mut doc = complete_document();
        doc.personal.summary = format!("{} Eu liderei meu time de cinco pessoas.", words(200));
        let report = analyze(&doc);
        assert_eq!(report.lexical.pronoun_count, 2);
        assert_eq!(report.lexical.pronouns_found, vec!["eu", "meu"]);
        assert_eq!(report.lexical.number_word_count, 1);
        assert!(!report.check(CheckId::FirstPersonPronouns).unwrap().passed);
        assert!(!report.check(CheckId::NumberWords).unwrap().passed);
        // 80 - 10 - 5 = 65 of 80
        assert_eq!(report.score, 81);
    }

    #[test]
    fn test_contact_requires_email_and_phone() {
        let mut doc = complete_document();
        doc.personal.phone = "  ".to_string();
        let report = analyze(&doc);
        assert!(!report.check(CheckId::ContactInfo).unwrap().passed);
        assert!(!report.identification.has_phone);
    }

    #[test]
    fn test_quantified_achievements_count_per_experience() {
        let mut doc = ResumeDocument::new();
        for description in ["Gerou R$ 1M", "Otimizou consultas", "Cuidou do backend"] {
            doc.add_experience(Experience {
                description: description.to_string(),
                ..Default::default()
            });
        }
        let report = analyze(&doc);
        assert_eq!(report.semantic.quantified_experiences, 2);
        assert!(report.check(CheckId::QuantifiedAchievements).unwrap().passed);
    }

    #[test]
    fn test_vocabulary_level_thresholds() {
        assert_eq!(VocabularyLevel::from_mean_length(5.1), VocabularyLevel::Alto);
        assert_eq!(VocabularyLevel::from_mean_length(5.0), VocabularyLevel::Medio);
        assert_eq!(VocabularyLevel::from_mean_length(4.0), VocabularyLevel::Baixo);
    }

    #[test]
    fn test_hard_skills_threshold() {
        let mut doc = complete_document();
        doc.remove_skill(0).unwrap();
        let report = analyze(&doc);
        assert!(!report.check(CheckId::HardSkills).unwrap().passed);
        assert_eq!(report.semantic.hard_skill_count, 4);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let doc = complete_document();
        let a = serde_json::to_value(analyze(&doc)).unwrap();
        let b = serde_json::to_value(analyze(&doc)).unwrap();
        assert_eq!(a, b);
    }
}
