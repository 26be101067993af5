//! Resume document model: the canonical profile data read by the analyzer,
//! the renderer and the export pipeline.
//!
//! Every array item carries a locally-unique `id` that stays stable across
//! reorders and edits. The document is never gated by validation: any subset
//! of fields may be empty.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("{kind} entry '{id}' not found")]
    EntryNotFound { kind: EntryKind, id: String },

    #[error("position {index} is out of bounds for {len} items")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("project '{0}' already lists technology '{1}'")]
    DuplicateTechnology(String, String),

    #[error("value cannot be empty")]
    EmptyValue,

    #[error("malformed resume JSON: {0}")]
    MalformedJson(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Document types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub summary: String,
}

/// Where an experience took place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum WorkMode {
    #[default]
    Presencial,
    Remoto,
    #[serde(rename = "Híbrido")]
    Hibrido,
}

impl WorkMode {
    pub fn label(&self) -> &'static str {
        match self {
            WorkMode::Presencial => "Presencial",
            WorkMode::Remoto => "Remoto",
            WorkMode::Hibrido => "Híbrido",
        }
    }
}

// Imported files come from hand-edited JSON; unknown modes fall back to the default.
impl<'de> Deserialize<'de> for WorkMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_lowercase().as_str() {
            "remoto" | "remote" => WorkMode::Remoto,
            "híbrido" | "hibrido" | "hybrid" => WorkMode::Hibrido,
            _ => WorkMode::Presencial,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub role: String,
    /// Free text, usually "YYYY-MM" or "YYYY".
    pub start_date: String,
    /// Ignored whenever `current` is set.
    pub end_date: String,
    pub current: bool,
    pub work_mode: WorkMode,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Ordered set: insertion order is kept, duplicates are dropped.
    pub technologies: Vec<String>,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Language {
    pub id: String,
    pub language: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub skills: Vec<String>,
    pub languages: Vec<Language>,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry union
// ────────────────────────────────────────────────────────────────────────────

/// The id-bearing collections of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Experience,
    Education,
    Project,
    Language,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Experience => "experience",
            EntryKind::Education => "education",
            EntryKind::Project => "project",
            EntryKind::Language => "language",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experience" => Ok(EntryKind::Experience),
            "education" => Ok(EntryKind::Education),
            "project" => Ok(EntryKind::Project),
            "language" => Ok(EntryKind::Language),
            other => Err(format!("unknown entry kind '{other}'")),
        }
    }
}

/// A single collection item, tagged by the collection it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    Experience(Experience),
    Education(Education),
    Project(Project),
    Language(Language),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Experience(_) => EntryKind::Experience,
            Entry::Education(_) => EntryKind::Education,
            Entry::Project(_) => EntryKind::Project,
            Entry::Language(_) => EntryKind::Language,
        }
    }

    /// A blank item of the given kind, ready to be filled in by field edits.
    pub fn blank(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Experience => Entry::Experience(Experience::default()),
            EntryKind::Education => Entry::Education(Education::default()),
            EntryKind::Project => Entry::Project(Project::default()),
            EntryKind::Language => Entry::Language(Language::default()),
        }
    }
}

/// Partial update of one collection item. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntryPatch {
    Experience(ExperiencePatch),
    Education(EducationPatch),
    Project(ProjectPatch),
    Language(LanguagePatch),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
    pub work_mode: Option<WorkMode>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationPatch {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguagePatch {
    pub language: Option<String>,
    pub level: Option<String>,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl ExperiencePatch {
    fn apply(self, target: &mut Experience) {
        set(&mut target.company, self.company);
        set(&mut target.role, self.role);
        set(&mut target.start_date, self.start_date);
        set(&mut target.end_date, self.end_date);
        set(&mut target.current, self.current);
        set(&mut target.work_mode, self.work_mode);
        set(&mut target.description, self.description);
    }
}

impl EducationPatch {
    fn apply(self, target: &mut Education) {
        set(&mut target.institution, self.institution);
        set(&mut target.degree, self.degree);
        set(&mut target.field, self.field);
        set(&mut target.start_date, self.start_date);
        set(&mut target.end_date, self.end_date);
    }
}

impl ProjectPatch {
    fn apply(self, target: &mut Project) {
        set(&mut target.name, self.name);
        set(&mut target.description, self.description);
        set(&mut target.link, self.link);
        if let Some(mut technologies) = self.technologies {
            dedupe_preserving_order(&mut technologies);
            target.technologies = technologies;
        }
    }
}

impl LanguagePatch {
    fn apply(self, target: &mut Language) {
        set(&mut target.language, self.language);
        set(&mut target.level, self.level);
    }
}

/// Addressable fields of `PersonalInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    FullName,
    Role,
    Email,
    Phone,
    Location,
    Linkedin,
    Github,
    Portfolio,
    Summary,
}

// ────────────────────────────────────────────────────────────────────────────
// Generic collection plumbing
// ────────────────────────────────────────────────────────────────────────────

trait Identified: Into<Entry> {
    const KIND: EntryKind;
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! impl_identified {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl Identified for $ty {
                const KIND: EntryKind = EntryKind::$kind;
                fn id(&self) -> &str {
                    &self.id
                }
                fn set_id(&mut self, id: String) {
                    self.id = id;
                }
            }

            impl From<$ty> for Entry {
                fn from(value: $ty) -> Self {
                    Entry::$kind(value)
                }
            }
        )*
    };
}

impl_identified!(
    Experience => Experience,
    Education => Education,
    Project => Project,
    Language => Language,
);

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn position<T: Identified>(items: &[T], id: &str) -> Result<usize, DocumentError> {
    items
        .iter()
        .position(|item| item.id() == id)
        .ok_or_else(|| DocumentError::EntryNotFound {
            kind: T::KIND,
            id: id.to_string(),
        })
}

fn find_mut<'a, T: Identified>(items: &'a mut [T], id: &str) -> Result<&'a mut T, DocumentError> {
    let index = position(items, id)?;
    Ok(&mut items[index])
}

/// Appends `item`, assigning a fresh id when its own is empty or already taken.
fn push_unique<T: Identified>(items: &mut Vec<T>, mut item: T) -> String {
    if item.id().trim().is_empty() || items.iter().any(|existing| existing.id() == item.id()) {
        item.set_id(new_id());
    }
    let id = item.id().to_string();
    items.push(item);
    id
}

fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> Result<Entry, DocumentError> {
    let index = position(items, id)?;
    Ok(items.remove(index).into())
}

fn move_by_id<T: Identified>(items: &mut Vec<T>, id: &str, to: usize) -> Result<(), DocumentError> {
    let from = position(items, id)?;
    if to >= items.len() {
        return Err(DocumentError::IndexOutOfBounds {
            index: to,
            len: items.len(),
        });
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

fn ensure_unique_ids<T: Identified>(items: &mut [T]) {
    let mut seen = HashSet::new();
    for item in items.iter_mut() {
        if item.id().trim().is_empty() || seen.contains(item.id()) {
            item.set_id(new_id());
        }
        seen.insert(item.id().to_string());
    }
}

fn dedupe_preserving_order(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain_mut(|value| {
        *value = value.trim().to_string();
        !value.is_empty() && seen.insert(value.clone())
    });
}

/// Removes `null` members so that `#[serde(default)]` fills them in.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

/// Numeric item ids are kept as their decimal text.
fn stringify_ids(value: &mut Value) {
    for key in ["experience", "education", "projects", "languages"] {
        let Some(Value::Array(items)) = value.get_mut(key) else {
            continue;
        };
        for id in items.iter_mut().filter_map(|item| item.get_mut("id")) {
            let text = match id {
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            *id = Value::String(text);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Mutation API
// ────────────────────────────────────────────────────────────────────────────

impl ResumeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an imported document. Missing keys and `null`s default to empty.
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        let mut value: Value =
            serde_json::from_str(raw).map_err(|e| DocumentError::MalformedJson(e.to_string()))?;
        Self::from_value(&mut value)
    }

    pub fn from_value(value: &mut Value) -> Result<Self, DocumentError> {
        if !value.is_object() {
            return Err(DocumentError::MalformedJson(
                "top-level value must be an object".to_string(),
            ));
        }
        strip_nulls(value);
        stringify_ids(value);
        let mut document: ResumeDocument = serde_json::from_value(value.take())
            .map_err(|e| DocumentError::MalformedJson(e.to_string()))?;
        document.normalize();
        Ok(document)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::MalformedJson(e.to_string()))
    }

    /// Restores id uniqueness and ordered-set semantics after a wholesale load.
    pub fn normalize(&mut self) {
        ensure_unique_ids(&mut self.experience);
        ensure_unique_ids(&mut self.education);
        ensure_unique_ids(&mut self.projects);
        ensure_unique_ids(&mut self.languages);
        for project in &mut self.projects {
            dedupe_preserving_order(&mut project.technologies);
        }
        self.skills.retain(|s| !s.trim().is_empty());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn replace(&mut self, mut other: ResumeDocument) {
        other.normalize();
        *self = other;
    }

    pub fn set_personal_field(&mut self, field: PersonalField, value: impl Into<String>) {
        let p = &mut self.personal;
        let slot = match field {
            PersonalField::FullName => &mut p.full_name,
            PersonalField::Role => &mut p.role,
            PersonalField::Email => &mut p.email,
            PersonalField::Phone => &mut p.phone,
            PersonalField::Location => &mut p.location,
            PersonalField::Linkedin => &mut p.linkedin,
            PersonalField::Github => &mut p.github,
            PersonalField::Portfolio => &mut p.portfolio,
            PersonalField::Summary => &mut p.summary,
        };
        *slot = value.into();
    }

    /// Appends an item to its collection and returns the id it ended up with.
    pub fn add_entry(&mut self, entry: Entry) -> String {
        match entry {
            Entry::Experience(item) => push_unique(&mut self.experience, item),
            Entry::Education(item) => push_unique(&mut self.education, item),
            Entry::Project(mut item) => {
                dedupe_preserving_order(&mut item.technologies);
                push_unique(&mut self.projects, item)
            }
            Entry::Language(item) => push_unique(&mut self.languages, item),
        }
    }

    pub fn remove_entry(&mut self, kind: EntryKind, id: &str) -> Result<Entry, DocumentError> {
        match kind {
            EntryKind::Experience => remove_by_id(&mut self.experience, id),
            EntryKind::Education => remove_by_id(&mut self.education, id),
            EntryKind::Project => remove_by_id(&mut self.projects, id),
            EntryKind::Language => remove_by_id(&mut self.languages, id),
        }
    }

    /// Updates the item with `id` in the collection named by the patch.
    pub fn update_entry(&mut self, id: &str, patch: EntryPatch) -> Result<(), DocumentError> {
        match patch {
            EntryPatch::Experience(p) => p.apply(find_mut(&mut self.experience, id)?),
            EntryPatch::Education(p) => p.apply(find_mut(&mut self.education, id)?),
            EntryPatch::Project(p) => p.apply(find_mut(&mut self.projects, id)?),
            EntryPatch::Language(p) => p.apply(find_mut(&mut self.languages, id)?),
        }
        Ok(())
    }

    /// Moves an item to position `to`; ids travel with their items.
    pub fn move_entry(&mut self, kind: EntryKind, id: &str, to: usize) -> Result<(), DocumentError> {
        match kind {
            EntryKind::Experience => move_by_id(&mut self.experience, id, to),
            EntryKind::Education => move_by_id(&mut self.education, id, to),
            EntryKind::Project => move_by_id(&mut self.projects, id, to),
            EntryKind::Language => move_by_id(&mut self.languages, id, to),
        }
    }

    pub fn entry_ids(&self, kind: EntryKind) -> Vec<&str> {
        match kind {
            EntryKind::Experience => self.experience.iter().map(|e| e.id()).collect(),
            EntryKind::Education => self.education.iter().map(|e| e.id()).collect(),
            EntryKind::Project => self.projects.iter().map(|e| e.id()).collect(),
            EntryKind::Language => self.languages.iter().map(|e| e.id()).collect(),
        }
    }

    pub fn add_experience(&mut self, experience: Experience) -> String {
        self.add_entry(Entry::Experience(experience))
    }

    pub fn remove_experience(&mut self, id: &str) -> Result<Experience, DocumentError> {
        let index = position(&self.experience, id)?;
        Ok(self.experience.remove(index))
    }

    /// Appends a trimmed skill; exact duplicates are ignored. Returns false when ignored.
    pub fn add_skill(&mut self, skill: &str) -> Result<bool, DocumentError> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(DocumentError::EmptyValue);
        }
        if self.skills.iter().any(|s| s == skill) {
            return Ok(false);
        }
        self.skills.push(skill.to_string());
        Ok(true)
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<String, DocumentError> {
        if index >= self.skills.len() {
            return Err(DocumentError::IndexOutOfBounds {
                index,
                len: self.skills.len(),
            });
        }
        Ok(self.skills.remove(index))
    }

    pub fn add_technology(&mut self, project_id: &str, technology: &str) -> Result<(), DocumentError> {
        let technology = technology.trim();
        if technology.is_empty() {
            return Err(DocumentError::EmptyValue);
        }
        let project = find_mut(&mut self.projects, project_id)?;
        if project.technologies.iter().any(|t| t == technology) {
            return Err(DocumentError::DuplicateTechnology(
                project_id.to_string(),
                technology.to_string(),
            ));
        }
        project.technologies.push(technology.to_string());
        Ok(())
    }

    pub fn remove_technology(&mut self, project_id: &str, technology: &str) -> Result<bool, DocumentError> {
        let project = find_mut(&mut self.projects, project_id)?;
        let before = project.technologies.len();
        project.technologies.retain(|t| t != technology);
        Ok(project.technologies.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experience(company: &str) -> Experience {
        Experience {
            company: company.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_import_missing_languages_defaults_to_empty() {
        let doc = ResumeDocument::from_json(
            r#"{"personal":{"fullName":"Ana Souza"},"skills":["Rust"]}"#,
        )
        .unwrap();
        assert!(doc.languages.is_empty());
        assert!(doc.experience.is_empty());
        assert_eq!(doc.personal.full_name, "Ana Souza");
        assert_eq!(doc.personal.email, "");
    }

    #[test]
    fn test_import_tolerates_nulls() {
        let doc = ResumeDocument::from_json(
            r#"{"personal":{"email":null},"experience":[{"id":"1","company":null,"current":true}],"projects":null}"#,
        )
        .unwrap();
        assert_eq!(doc.experience.len(), 1);
        assert!(doc.experience[0].current);
        assert!(doc.projects.is_empty());
    }

    #[test]
    fn test_import_accepts_numeric_ids() {
        let doc = ResumeDocument::from_json(
            r#"{"experience": [{"id": 1712345678, "company": "Acme"}],
                "languages": [{"id": 2, "language": "Inglês"}, {"id": "2", "language": "Espanhol"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.experience[0].id, "1712345678");
        assert_eq!(doc.languages[0].id, "2");
        assert_ne!(doc.languages[1].id, "2");
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let err = ResumeDocument::from_json("{not json").unwrap_err();
        assert!(matches!(err, DocumentError::MalformedJson(_)));
        assert!(matches!(
            ResumeDocument::from_json("[1,2]").unwrap_err(),
            DocumentError::MalformedJson(_)
        ));
    }

    #[test]
    fn test_import_reassigns_duplicate_and_missing_ids() {
        let doc = ResumeDocument::from_json(
            r#"{"experience":[{"id":"a"},{"id":"a"},{}]}"#,
        )
        .unwrap();
        let ids = doc.entry_ids(EntryKind::Experience);
        assert_eq!(ids[0], "a");
        assert_ne!(ids[1], "a");
        assert!(!ids[2].is_empty());
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_work_mode_is_lenient() {
        let doc = ResumeDocument::from_json(
            r#"{"experience":[{"workMode":"Hibrido"},{"workMode":"Remoto"},{"workMode":"???"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.experience[0].work_mode, WorkMode::Hibrido);
        assert_eq!(doc.experience[1].work_mode, WorkMode::Remoto);
        assert_eq!(doc.experience[2].work_mode, WorkMode::Presencial);
    }

    #[test]
    fn test_json_export_uses_schema_keys() {
        let mut doc = ResumeDocument::new();
        doc.set_personal_field(PersonalField::FullName, "Ana");
        doc.add_experience(Experience {
            work_mode: WorkMode::Hibrido,
            ..experience("Acme")
        });
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"workMode\": \"Híbrido\""));
        assert_eq!(ResumeDocument::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_add_entry_assigns_id_when_missing() {
        let mut doc = ResumeDocument::new();
        let id = doc.add_entry(Entry::blank(EntryKind::Education));
        assert!(!id.is_empty());
        assert_eq!(doc.education[0].id, id);
    }

    #[test]
    fn test_add_entry_replaces_colliding_id() {
        let mut doc = ResumeDocument::new();
        let first = doc.add_experience(Experience {
            id: "x".to_string(),
            ..experience("A")
        });
        let second = doc.add_experience(Experience {
            id: "x".to_string(),
            ..experience("B")
        });
        assert_eq!(first, "x");
        assert_ne!(second, "x");
    }

    #[test]
    fn test_update_entry_applies_only_given_fields() {
        let mut doc = ResumeDocument::new();
        let id = doc.add_experience(Experience {
            role: "Dev".to_string(),
            ..experience("Acme")
        });
        doc.update_entry(
            &id,
            EntryPatch::Experience(ExperiencePatch {
                company: Some("Globex".to_string()),
                current: Some(true),
                ..Default::default()
            }),
        )
        .unwrap();
        let item = &doc.experience[0];
        assert_eq!(item.company, "Globex");
        assert_eq!(item.role, "Dev");
        assert!(item.current);
    }

    #[test]
    fn test_update_entry_unknown_id_fails() {
        let mut doc = ResumeDocument::new();
        let err = doc
            .update_entry("nope", EntryPatch::Language(LanguagePatch::default()))
            .unwrap_err();
        assert_eq!(
            err,
            DocumentError::EntryNotFound {
                kind: EntryKind::Language,
                id: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_patch_deserializes_from_tagged_json() {
        let patch: EntryPatch =
            serde_json::from_str(r#"{"kind":"project","technologies":["Rust","Rust","Go"]}"#)
                .unwrap();
        let mut doc = ResumeDocument::new();
        let id = doc.add_entry(Entry::blank(EntryKind::Project));
        doc.update_entry(&id, patch).unwrap();
        assert_eq!(doc.projects[0].technologies, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_move_entry_keeps_identity() {
        let mut doc = ResumeDocument::new();
        let a = doc.add_experience(experience("A"));
        let b = doc.add_experience(experience("B"));
        let c = doc.add_experience(experience("C"));
        doc.move_entry(EntryKind::Experience, &c, 0).unwrap();
        assert_eq!(doc.entry_ids(EntryKind::Experience), vec![c.as_str(), a.as_str(), b.as_str()]);
        assert_eq!(doc.experience[0].company, "C");
        assert!(matches!(
            doc.move_entry(EntryKind::Experience, &a, 3),
            Err(DocumentError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_remove_entry_returns_item() {
        let mut doc = ResumeDocument::new();
        let id = doc.add_experience(experience("A"));
        let removed = doc.remove_entry(EntryKind::Experience, &id).unwrap();
        assert_eq!(removed.kind(), EntryKind::Experience);
        assert!(doc.experience.is_empty());
        assert!(doc.remove_experience(&id).is_err());
    }

    #[test]
    fn test_skills_are_trimmed_and_deduplicated() {
        let mut doc = ResumeDocument::new();
        assert!(doc.add_skill("  Rust ").unwrap());
        assert!(!doc.add_skill("Rust").unwrap());
        assert_eq!(doc.add_skill("   "), Err(DocumentError::EmptyValue));
        assert_eq!(doc.skills, vec!["Rust"]);
        assert_eq!(doc.remove_skill(0).unwrap(), "Rust");
        assert!(doc.remove_skill(0).is_err());
    }

    #[test]
    fn test_technologies_are_an_ordered_set() {
        let mut doc = ResumeDocument::new();
        let id = doc.add_entry(Entry::blank(EntryKind::Project));
        doc.add_technology(&id, "Rust").unwrap();
        doc.add_technology(&id, "Tokio").unwrap();
        assert!(matches!(
            doc.add_technology(&id, "Rust"),
            Err(DocumentError::DuplicateTechnology(_, _))
        ));
        assert!(doc.remove_technology(&id, "Rust").unwrap());
        assert_eq!(doc.projects[0].technologies, vec!["Tokio"]);
    }

    #[test]
    fn test_reset_empties_document() {
        let mut doc = ResumeDocument::new();
        doc.add_skill("Rust").unwrap();
        doc.reset();
        assert_eq!(doc, ResumeDocument::default());
    }
}
