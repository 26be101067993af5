//! Template Rendering Engine.
//!
//! `render(document, template, mode)` turns a resume into HTML. Preview mode
//! produces an embeddable screen fragment; export mode produces a standalone
//! print-grade A4 document. For a fixed (document, template) both modes emit
//! the same ordered list of sections: only the page shell differs.
//!
//! Sections whose backing data is empty are omitted entirely, heading and
//! container included. The omission rule lives here, not in the templates.

pub mod dates;
pub mod html;
pub mod templates;
pub mod watermark;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeDocument;
use crate::render::html::escape;
use crate::render::templates::{template_for, ResumeTemplate};

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Modern,
    Classic,
    Minimal,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [TemplateId::Modern, TemplateId::Classic, TemplateId::Minimal];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Classic => "classic",
            TemplateId::Minimal => "minimal",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateId::Modern => "Moderno",
            TemplateId::Classic => "Clássico",
            TemplateId::Minimal => "Minimalista",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Preview,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Summary,
    Experience,
    Education,
    Projects,
    Skills,
    Languages,
}

impl SectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Summary => "summary",
            SectionId::Experience => "experience",
            SectionId::Education => "education",
            SectionId::Projects => "projects",
            SectionId::Skills => "skills",
            SectionId::Languages => "languages",
        }
    }

    /// Whether the document has anything to show for this section.
    pub fn has_content(&self, document: &ResumeDocument) -> bool {
        match self {
            SectionId::Summary => !document.personal.summary.trim().is_empty(),
            SectionId::Experience => !document.experience.is_empty(),
            SectionId::Education => !document.education.is_empty(),
            SectionId::Projects => !document.projects.is_empty(),
            SectionId::Skills => !document.skills.is_empty(),
            SectionId::Languages => !document.languages.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Tiled overlay text; `None` renders a clean document.
    pub watermark: Option<String>,
}

impl RenderOptions {
    pub fn watermarked() -> Self {
        Self {
            watermark: Some(watermark::DEFAULT_TEXT.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedOutput {
    pub template: TemplateId,
    pub mode: RenderMode,
    /// Rendered sections in document order.
    pub sections: Vec<SectionId>,
    pub html: String,
    pub watermarked: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Renders without a watermark.
pub fn render(document: &ResumeDocument, template: TemplateId, mode: RenderMode) -> RenderedOutput {
    render_with(document, template, mode, &RenderOptions::default())
}

pub fn render_with(
    document: &ResumeDocument,
    template_id: TemplateId,
    mode: RenderMode,
    options: &RenderOptions,
) -> RenderedOutput {
    let template = template_for(template_id);
    let (sections, body) = render_body(template, document);

    let overlay = options
        .watermark
        .as_deref()
        .map(watermark::overlay)
        .unwrap_or_default();
    let article = format!(
        "<article class=\"resume resume-{id}\" data-template=\"{id}\">{overlay}{body}</article>",
        id = template_id.as_str()
    );

    let mut styles = String::from(BASE_STYLES);
    styles.push_str(template.stylesheet());
    if options.watermark.is_some() {
        styles.push_str(watermark::STYLES);
    }

    let html = match mode {
        RenderMode::Preview => {
            styles.push_str(SCREEN_STYLES);
            format!(
                "<div class=\"rf-preview\" data-mode=\"preview\"><style>{styles}</style>{article}</div>"
            )
        }
        RenderMode::Export => {
            styles.push_str(PRINT_STYLES);
            let title = if document.personal.full_name.trim().is_empty() {
                "Currículo".to_string()
            } else {
                format!("{} - Currículo", escape(document.personal.full_name.trim()))
            };
            format!(
                "<!DOCTYPE html><html lang=\"pt-BR\" data-mode=\"export\"><head><meta charset=\"utf-8\">\
                 <title>{title}</title><style>{styles}</style></head><body>{article}</body></html>"
            )
        }
    };

    RenderedOutput {
        template: template.id(),
        mode,
        sections,
        html,
        watermarked: options.watermark.is_some(),
    }
}

/// Header plus every non-empty section, laid out in the template's columns.
fn render_body(template: &dyn ResumeTemplate, document: &ResumeDocument) -> (Vec<SectionId>, String) {
    let mut sections = Vec::new();
    let mut body = template.header(&document.personal);

    for column in template.columns() {
        let mut column_html = String::new();
        for &section in column.sections {
            if !section.has_content(document) {
                continue;
            }
            sections.push(section);
            column_html.push_str(&format!(
                "<section class=\"section section-{id}\" data-section=\"{id}\">\
                 <h2 class=\"section-title\">{heading}</h2>{content}</section>",
                id = section.as_str(),
                heading = escape(&template.heading(section)),
                content = template.section_body(section, document),
            ));
        }
        if !column_html.is_empty() {
            body.push_str(&format!("<div class=\"{}\">{column_html}</div>", column.class));
        }
    }

    (sections, body)
}

/// Section ids in the order their `data-section` markers appear in `html`.
#[cfg(test)]
pub fn sections_in_markup(html: &str) -> Vec<String> {
    const MARKER: &str = "data-section=\"";
    let mut found = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find(MARKER) {
        rest = &rest[start + MARKER.len()..];
        if let Some(end) = rest.find('"') {
            found.push(rest[..end].to_string());
            rest = &rest[end..];
        }
    }
    found
}

const BASE_STYLES: &str = "\
*{box-sizing:border-box}\
.resume{font-family:'Inter','Helvetica Neue',Arial,sans-serif;color:#1f2933;line-height:1.45;background:#fff}\
.resume a{color:inherit;text-decoration:none}\
.resume p{margin:0 0 4px}\
.resume ul{margin:0;padding:0;list-style:none}";

const SCREEN_STYLES: &str = "\
.rf-preview{overflow:auto;padding:16px;background:#e5e7eb}\
.rf-preview .resume{width:210mm;min-height:297mm;margin:0 auto;box-shadow:0 4px 24px rgba(0,0,0,.15)}";

const PRINT_STYLES: &str = "\
@page{size:A4;margin:0}\
html,body{margin:0;padding:0}\
.resume{width:210mm;min-height:297mm}\
.section,.entry{break-inside:avoid;page-break-inside:avoid}\
@media print{body{-webkit-print-color-adjust:exact;print-color-adjust:exact}}";
