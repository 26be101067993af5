//! Diagonal tiled overlay marking an unpaid export as a preview copy.
//!
//! The overlay sits above the content with low opacity and ignores pointer
//! events, so the resume stays readable but is visibly not the final file.

use crate::render::html::escape;

pub const DEFAULT_TEXT: &str = "PRÉVIA · NÃO PAGO";
const ROWS: usize = 12;
const COLUMNS: usize = 4;

pub const STYLES: &str = "\
.resume{position:relative}\
.rf-watermark{position:absolute;inset:-25%;z-index:20;pointer-events:none;user-select:none;\
display:grid;grid-template-columns:repeat(4,1fr);align-content:space-around;\
transform:rotate(-35deg);opacity:.12;overflow:hidden}\
.rf-watermark span{font:700 22px/1 sans-serif;letter-spacing:.2em;color:#c00;\
white-space:nowrap;text-align:center;padding:48px 0}\
@media print{.rf-watermark{position:fixed;-webkit-print-color-adjust:exact;print-color-adjust:exact}}";

pub fn overlay(text: &str) -> String {
    let tile = format!("<span>{}</span>", escape(text));
    format!(
        "<div class=\"rf-watermark\" aria-hidden=\"true\">{}</div>",
        tile.repeat(ROWS * COLUMNS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_tiles_the_text() {
        let html = overlay("PRÉVIA");
        assert_eq!(html.matches("<span>PRÉVIA</span>").count(), ROWS * COLUMNS);
        assert!(html.contains("aria-hidden=\"true\""));
    }

    #[test]
    fn test_overlay_escapes_text() {
        assert!(overlay("<x>").contains("&lt;x&gt;"));
    }

    #[test]
    fn test_styles_keep_content_interactive() {
        assert!(STYLES.contains("pointer-events:none"));
        assert!(STYLES.contains("rotate(-35deg)"));
    }
}
