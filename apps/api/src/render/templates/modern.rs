//! Modern: colored banner header and a two-column body with a tinted sidebar.

use super::{
    contact_items, default_heading, degree_line, education_period, experience_period,
    has_header, project_link, technology_tags, Column, ResumeTemplate,
};
use crate::models::resume::{PersonalInfo, ResumeDocument};
use crate::render::html::{escape, join_present, paragraphs, text_element};
use crate::render::{SectionId, TemplateId};

pub struct ModernTemplate;

const COLUMNS: &[Column] = &[
    Column {
        class: "modern-main",
        sections: &[SectionId::Summary, SectionId::Experience, SectionId::Projects],
    },
    Column {
        class: "modern-sidebar",
        sections: &[SectionId::Education, SectionId::Skills, SectionId::Languages],
    },
];

const STYLES: &str = "\
.resume-modern{display:grid;grid-template-columns:2fr 1fr;grid-template-areas:'header header' 'main side'}\
.resume-modern .modern-header{grid-area:header;background:#1e3a8a;color:#fff;padding:28px 32px}\
.resume-modern .modern-header h1{margin:0;font-size:28px}\
.resume-modern .modern-role{margin:4px 0 10px;font-size:15px;color:#bfdbfe}\
.resume-modern .modern-contacts{display:flex;flex-wrap:wrap;gap:6px 16px;font-size:12px}\
.resume-modern .modern-main{grid-area:main;padding:24px 32px}\
.resume-modern .modern-sidebar{grid-area:side;padding:24px 20px;background:#eff6ff}\
.resume-modern .section{margin-bottom:18px}\
.resume-modern .section-title{font-size:14px;text-transform:uppercase;letter-spacing:.08em;color:#1e3a8a;border-bottom:2px solid #93c5fd;padding-bottom:4px}\
.resume-modern .entry{margin-bottom:12px}\
.resume-modern .entry-head{display:flex;justify-content:space-between;gap:8px}\
.resume-modern .entry-title{font-weight:600}\
.resume-modern .entry-meta{font-size:12px;color:#64748b}\
.resume-modern .chips{display:flex;flex-wrap:wrap;gap:4px}\
.resume-modern .chips li{background:#dbeafe;color:#1e3a8a;border-radius:10px;padding:2px 8px;font-size:11px}";

impl ModernTemplate {
    fn experience(&self, document: &ResumeDocument) -> String {
        document
            .experience
            .iter()
            .map(|item| {
                let title = escape(&join_present(
                    &[item.role.as_str(), item.company.as_str()],
                    " · ",
                ));
                format!(
                    "<div class=\"entry\"><div class=\"entry-head\"><span class=\"entry-title\">{title}</span>{period}</div>\
                     <div class=\"entry-meta\">{mode}</div>{description}</div>",
                    period = text_element("span", "entry-meta", &experience_period(item)),
                    mode = escape(item.work_mode.label()),
                    description = paragraphs(&item.description),
                )
            })
            .collect()
    }

    fn projects(&self, document: &ResumeDocument) -> String {
        document
            .projects
            .iter()
            .map(|project| {
                format!(
                    "<div class=\"entry\"><div class=\"entry-head\">{name}{link}</div>{description}{tags}</div>",
                    name = text_element("span", "entry-title", &project.name),
                    link = project_link(project),
                    description = paragraphs(&project.description),
                    tags = technology_tags(project, "chips"),
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
                    "<div class=\"entry\">{degree}{institution}{period}</div>",
                    degree = text_element("div", "entry-title", &degree_line(item)),
                    institution = text_element("div", "entry-institution", &item.institution),
                    period = text_element("div", "entry-meta", &education_period(item)),
                )
            })
            .collect()
    }
}

impl ResumeTemplate for ModernTemplate {
    fn id(&self) -> TemplateId {
        TemplateId::Modern
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn heading(&self, section: SectionId) -> String {
        default_heading(section).to_string()
    }

    fn header(&self, personal: &PersonalInfo) -> String {
        if !has_header(personal) {
            return String::new();
        }
        let contacts: String = contact_items(personal).concat();
        format!(
            "<header class=\"modern-header\">{name}{role}<div class=\"modern-contacts\">{contacts}</div></header>",
            name = text_element("h1", "name", &personal.full_name),
            role = text_element("p", "modern-role", &personal.role),
        )
    }

    fn section_body(&self, section: SectionId, document: &ResumeDocument) -> String {
        match section {
            SectionId::Summary => paragraphs(&document.personal.summary),
            SectionId::Experience => self.experience(document),
            SectionId::Projects => self.projects(document),
            SectionId::Education => self.education(document),
            SectionId::Skills => {
                let chips: String = document
                    .skills
                    .iter()
                    .map(|s| format!("<li>{}</li>", escape(s)))
                    .collect();
                format!("<ul class=\"chips\">{chips}</ul>")
            }
            SectionId::Languages => {
                let rows: String = document
                    .languages
                    .iter()
                    .map(|l| {
                        let level = if l.level.trim().is_empty() {
                            String::new()
                        } else {
                            format!("<span class=\"entry-meta\"> — {}</span>", escape(l.level.trim()))
                        };
                        format!(
                            "<li>{}{level}</li>",
                            text_element("span", "entry-title", &l.language)
                        )
                    })
                    .collect();
                format!("<ul class=\"languages\">{rows}</ul>")
            }
        }
    }

    fn stylesheet(&self) -> &'static str {
        STYLES
    }
}
