//! Classic: single serif column, centered header, ruled uppercase headings.

use super::{
    contact_items, default_heading, degree_line, education_period, experience_period,
    has_header, project_link, Column, ResumeTemplate,
};
use crate::models::resume::{PersonalInfo, ResumeDocument};
use crate::render::html::{escape, join_present, paragraphs, text_element};
use crate::render::{SectionId, TemplateId};

pub struct ClassicTemplate;

const COLUMNS: &[Column] = &[Column {
    class: "classic-body",
    sections: &[
        SectionId::Summary,
        SectionId::Experience,
        SectionId::Education,
        SectionId::Projects,
        SectionId::Skills,
        SectionId::Languages,
    ],
}];

const STYLES: &str = "\
.resume-classic{font-family:Georgia,'Times New Roman',serif;padding:36px 48px}\
.resume-classic .classic-header{text-align:center;margin-bottom:16px}\
.resume-classic .classic-header h1{margin:0;font-size:26px;letter-spacing:.04em}\
.resume-classic .classic-role{margin:2px 0 8px;font-style:italic}\
.resume-classic .classic-contacts{font-size:12px}\
.resume-classic .classic-contacts>*+*::before{content:' | '}\
.resume-classic .section{margin-bottom:14px}\
.resume-classic .section-title{font-size:13px;text-transform:uppercase;letter-spacing:.12em;border-bottom:1px solid #111;margin:0 0 8px;padding-bottom:2px}\
.resume-classic .entry{margin-bottom:10px}\
.resume-classic .entry-head{display:flex;justify-content:space-between}\
.resume-classic .entry-title{font-weight:700}\
.resume-classic .entry-meta{font-style:italic;font-size:12px}";

impl ClassicTemplate {
    fn experience(&self, document: &ResumeDocument) -> String {
        document
            .experience
            .iter()
            .map(|item| {
                let subtitle = join_present(&[item.company.as_str(), item.work_mode.label()], ", ");
                format!(
                    "<div class=\"entry\"><div class=\"entry-head\">{role}{period}</div>{subtitle}{description}</div>",
                    role = text_element("span", "entry-title", &item.role),
                    period = text_element("span", "entry-meta", &experience_period(item)),
                    subtitle = text_element("div", "entry-meta", &subtitle),
                    description = paragraphs(&item.description),
                )
            })
            .collect()
    }

    fn education(&self, document: &ResumeDocument) -> String {
        document
            .education
            .iter()
            .map(|item| {
                format!(
                    "<div class=\"entry\"><div class=\"entry-head\">{institution}{period}</div>{degree}</div>",
                    institution = text_element("span", "entry-title", &item.institution),
                    period = text_element("span", "entry-meta", &education_period(item)),
                    degree = text_element("div", "entry-degree", &degree_line(item)),
                )
            })
            .collect()
    }

    fn projects(&self, document: &ResumeDocument) -> String {
        document
            .projects
            .iter()
            .map(|project| {
                let stack = project.technologies.join(", ");
                format!(
                    "<div class=\"entry\"><div class=\"entry-head\">{name}{link}</div>{description}{stack}</div>",
                    name = text_element("span", "entry-title", &project.name),
                    link = project_link(project),
                    description = paragraphs(&project.description),
                    stack = text_element("div", "entry-meta", &stack),
                )
            })
            .collect()
    }
}

impl ResumeTemplate for ClassicTemplate {
    fn id(&self) -> TemplateId {
        TemplateId::Classic
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn heading(&self, section: SectionId) -> String {
        default_heading(section).to_uppercase()
    }

    fn header(&self, personal: &PersonalInfo) -> String {
        if !has_header(personal) {
            return String::new();
        }
        format!(
            "<header class=\"classic-header\">{name}{role}<div class=\"classic-contacts\">{contacts}</div></header>",
            name = text_element("h1", "name", &personal.full_name),
            role = text_element("p", "classic-role", &personal.role),
            contacts = contact_items(personal).concat(),
        )
    }

    fn section_body(&self, section: SectionId, document: &ResumeDocument) -> String {
        match section {
            SectionId::Summary => paragraphs(&document.personal.summary),
            SectionId::Experience => self.experience(document),
            SectionId::Education => self.education(document),
            SectionId::Projects => self.projects(document),
            SectionId::Skills => format!("<p>{}</p>", escape(&document.skills.join(", "))),
            SectionId::Languages => {
                let items: Vec<String> = document
                    .languages
                    .iter()
                    .map(|l| match (l.language.trim(), l.level.trim()) {
                        (language, "") => escape(language),
                        (language, level) => format!("{} ({})", escape(language), escape(level)),
                    })
                    .collect();
                format!("<p>{}</p>", items.join(" · "))
            }
        }
    }

    fn stylesheet(&self) -> &'static str {
        STYLES
    }
}
