//! Resume templates. Each template decides markup and column layout; the
//! engine in `render` decides which sections exist.

mod classic;
mod minimal;
mod modern;

use crate::models::resume::{Education, Experience, PersonalInfo, Project, ResumeDocument};
use crate::render::dates::format_period;
use crate::render::html::{escape, href, join_present};
use crate::render::{SectionId, TemplateId};

pub use classic::ClassicTemplate;
pub use minimal::MinimalTemplate;
pub use modern::ModernTemplate;

/// A layout column and the sections it may hold, in order.
pub struct Column {
    pub class: &'static str,
    pub sections: &'static [SectionId],
}

pub trait ResumeTemplate: Send + Sync {
    fn id(&self) -> TemplateId;

    /// Columns in markup order. Together they list every section exactly once.
    fn columns(&self) -> &'static [Column];

    fn heading(&self, section: SectionId) -> String;

    /// Name, role and contacts. Empty string when there is nothing to show.
    fn header(&self, personal: &PersonalInfo) -> String;

    /// Inner markup of a section known to have content.
    fn section_body(&self, section: SectionId, document: &ResumeDocument) -> String;

    fn stylesheet(&self) -> &'static str;
}

static MODERN: ModernTemplate = ModernTemplate;
static CLASSIC: ClassicTemplate = ClassicTemplate;
static MINIMAL: MinimalTemplate = MinimalTemplate;

pub fn template_for(id: TemplateId) -> &'static dyn ResumeTemplate {
    match id {
        TemplateId::Modern => &MODERN,
        TemplateId::Classic => &CLASSIC,
        TemplateId::Minimal => &MINIMAL,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared fragments
// ────────────────────────────────────────────────────────────────────────────

/// Portuguese section titles shared by the templates.
pub(crate) fn default_heading(section: SectionId) -> &'static str {
    match section {
        SectionId::Summary => "Resumo Profissional",
        SectionId::Experience => "Experiência Profissional",
        SectionId::Education => "Formação Acadêmica",
        SectionId::Projects => "Projetos",
        SectionId::Skills => "Competências",
        SectionId::Languages => "Idiomas",
    }
}

fn display_url(url: &str) -> String {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.strip_prefix("www.").unwrap_or(url).trim_end_matches('/').to_string()
}

/// Contact items as escaped inline markup, skipping blank fields.
pub(crate) fn contact_items(personal: &PersonalInfo) -> Vec<String> {
    let mut items = Vec::new();
    let email = personal.email.trim();
    if !email.is_empty() {
        items.push(format!(
            "<a href=\"mailto:{}\">{}</a>",
            escape(email),
            escape(email)
        ));
    }
    for plain in [&personal.phone, &personal.location] {
        if !plain.trim().is_empty() {
            items.push(format!("<span>{}</span>", escape(plain.trim())));
        }
    }
    for url in [&personal.linkedin, &personal.github, &personal.portfolio] {
        if !url.trim().is_empty() {
            items.push(format!(
                "<a href=\"{}\">{}</a>",
                href(url),
                escape(&display_url(url))
            ));
        }
    }
    items
}

pub(crate) fn has_header(personal: &PersonalInfo) -> bool {
    !personal.full_name.trim().is_empty()
        || !personal.role.trim().is_empty()
        || !contact_items(personal).is_empty()
}

pub(crate) fn experience_period(item: &Experience) -> String {
    format_period(&item.start_date, &item.end_date, item.current)
}

pub(crate) fn education_period(item: &Education) -> String {
    format_period(&item.start_date, &item.end_date, false)
}

/// "Degree em Field", tolerating either side missing.
pub(crate) fn degree_line(item: &Education) -> String {
    join_present(&[item.degree.as_str(), item.field.as_str()], " em ")
}

pub(crate) fn technology_tags(project: &Project, class: &str) -> String {
    if project.technologies.is_empty() {
        return String::new();
    }
    let tags: String = project
        .technologies
        .iter()
        .map(|t| format!("<li>{}</li>", escape(t)))
        .collect();
    format!("<ul class=\"{class}\">{tags}</ul>")
}

pub(crate) fn project_link(project: &Project) -> String {
    if project.link.trim().is_empty() {
        return String::new();
    }
    format!(
        "<a class=\"entry-link\" href=\"{}\">{}</a>",
        href(&project.link),
        escape(&display_url(&project.link))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_template_lists_each_section_once() {
        for id in TemplateId::ALL {
            let template = template_for(id);
            assert_eq!(template.id(), id);
            let listed: Vec<SectionId> = template
                .columns()
                .iter()
                .flat_map(|c| c.sections.iter().copied())
                .collect();
            let unique: HashSet<_> = listed.iter().collect();
            assert_eq!(listed.len(), 6, "template {id}");
            assert_eq!(unique.len(), 6, "template {id}");
        }
    }

    #[test]
    fn test_contact_items_skip_blank_fields() {
        let personal = PersonalInfo {
            email: "a@b.co".to_string(),
            linkedin: "https://www.linkedin.com/in/ana/".to_string(),
            phone: "  ".to_string(),
            ..Default::default()
        };
        let items = contact_items(&personal);
        assert_eq!(items.len(), 2);
        assert!(items[1].contains(">linkedin.com/in/ana<"));
    }

    #[test]
    fn test_header_absent_for_blank_personal_info() {
        assert!(!has_header(&PersonalInfo::default()));
        let named = PersonalInfo {
            full_name: "Ana".to_string(),
            ..Default::default()
        };
        assert!(has_header(&named));
    }

    #[test]
    fn test_degree_line() {
        let edu = Education {
            degree: "Bacharelado".to_string(),
            field: "Computação".to_string(),
            ..Default::default()
        };
        assert_eq!(degree_line(&edu), "Bacharelado em Computação");
        assert_eq!(degree_line(&Education::default()), "");
    }
}
