//! Minimal: narrow single column, lowercase headings, dates in a left gutter.

use super::{
    contact_items, default_heading, degree_line, education_period, experience_period,
    has_header, project_link, technology_tags, Column, ResumeTemplate,
};
use crate::models::resume::{PersonalInfo, ResumeDocument};
use crate::render::html::{escape, join_present, paragraphs, text_element};
use crate::render::{SectionId, TemplateId};

pub struct MinimalTemplate;

const COLUMNS: &[Column] = &[Column {
    class: "minimal-body",
    sections: &[
        SectionId::Summary,
        SectionId::Skills,
        SectionId::Experience,
        SectionId::Projects,
        SectionId::Education,
        SectionId::Languages,
    ],
}];

const STYLES: &str = "\
.resume-minimal{padding:48px 64px;font-size:13px;color:#111}\
.resume-minimal .minimal-header h1{margin:0;font-weight:300;font-size:30px}\
.resume-minimal .minimal-role{margin:0 0 8px;color:#555}\
.resume-minimal .minimal-contacts{display:flex;flex-wrap:wrap;gap:4px 14px;font-size:11px;color:#555;margin-bottom:24px}\
.resume-minimal .section{margin-bottom:20px}\
.resume-minimal .section-title{font-size:12px;font-weight:400;text-transform:lowercase;color:#888;margin:0 0 8px}\
.resume-minimal .entry{display:grid;grid-template-columns:110px 1fr;gap:12px;margin-bottom:10px}\
.resume-minimal .entry-when{color:#888;font-size:11px}\
.resume-minimal .entry-title{font-weight:500}\
.resume-minimal .inline-list{display:flex;flex-wrap:wrap;gap:2px 10px;color:#444}";

fn entry(when: &str, content: String) -> String {
    format!(
        "<div class=\"entry\"><div class=\"entry-when\">{}</div><div>{content}</div></div>",
        escape(when)
    )
}

impl MinimalTemplate {
    fn experience(&self, document: &ResumeDocument) -> String {
        document
            .experience
            .iter()
            .map(|item| {
                let title = join_present(&[item.role.as_str(), item.company.as_str()], " @ ");
                entry(
                    &experience_period(item),
                    format!(
                        "{}{}{}",
                        text_element("div", "entry-title", &title),
                        text_element("div", "entry-when", item.work_mode.label()),
                        paragraphs(&item.description),
                    ),
                )
            })
            .collect()
    }

    fn projects(&self, document: &ResumeDocument) -> String {
        document
            .projects
            .iter()
            .map(|project| {
                entry(
                    "",
                    format!(
                        "{}{}{}{}",
                        text_element("div", "entry-title", &project.name),
                        paragraphs(&project.description),
                        technology_tags(project, "inline-list"),
                        project_link(project),
                    ),
                )
            })
            .collect()
    }

    fn education(&self, document: &ResumeDocument) -> String {
        document
            .education
            .iter()
            .map(|item| {
                entry(
                    &education_period(item),
                    format!(
                        "{}{}",
                        text_element("div", "entry-title", &degree_line(item)),
                        text_element("div", "entry-institution", &item.institution),
                    ),
                )
            })
            .collect()
    }
}

impl ResumeTemplate for MinimalTemplate {
    fn id(&self) -> TemplateId {
        TemplateId::Minimal
    }

    fn columns(&self) -> &'static [Column] {
        COLUMNS
    }

    fn heading(&self, section: SectionId) -> String {
        default_heading(section).to_lowercase()
    }

    fn header(&self, personal: &PersonalInfo) -> String {
        if !has_header(personal) {
            return String::new();
        }
        format!(
            "<header class=\"minimal-header\">{name}{role}<div class=\"minimal-contacts\">{contacts}</div></header>",
            name = text_element("h1", "name", &personal.full_name),
            role = text_element("p", "minimal-role", &personal.role),
            contacts = contact_items(personal).concat(),
        )
    }

    fn section_body(&self, section: SectionId, document: &ResumeDocument) -> String {
        match section {
            SectionId::Summary => paragraphs(&document.personal.summary),
            SectionId::Skills => {
                let items: String = document
                    .skills
                    .iter()
                    .map(|s| format!("<li>{}</li>", escape(s)))
                    .collect();
                format!("<ul class=\"inline-list\">{items}</ul>")
            }
            SectionId::Experience => self.experience(document),
            SectionId::Projects => self.projects(document),
            SectionId::Education => self.education(document),
            SectionId::Languages => {
                let items: String = document
                    .languages
                    .iter()
                    .map(|l| {
                        let line = join_present(&[l.language.as_str(), l.level.as_str()], " — ");
                        format!("<li>{}</li>", escape(&line))
                    })
                    .collect();
                format!("<ul class=\"inline-list\">{items}</ul>")
            }
        }
    }

    fn stylesheet(&self) -> &'static str {
        STYLES
    }
}
