//! Legacy related-documents rendering.
//!
//! Predecessor of the widget renderer kept for older embeds: one fixed
//! (beta) API deployment, no title fallback, and a flatter list rendered
//! as a complete HTML document. Parser problems are echoed inline instead
//! of aborting the request.

use quick_xml::escape::escape;

use crate::recommender::model::Recommendation;

/// Render the legacy document: fieldset shell around a flat list.
///
/// Per item: raw (escape-on-embed) authors, the title linked at the
/// fallback URL with an inline external logging call, the year when
/// positive, and the venue when present.
pub fn render_related_documents(records: &[Recommendation], click_log_base: &str) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<body>\n");
    html.push_str("<fieldset>\n<legend>See Also:</legend>\n<br>\n");
    html.push_str("<ul class=\"rec\">\n");

    for record in records {
        html.push_str("<li>\n");
        html.push_str(&format!(
            "<div class='mdl-authors'>{}</div>\n",
            escape(record.authors.trim())
        ));
        html.push_str("<div class='article_link'>\n");
        html.push_str(&format!(
            "<a class='mdl-title' href='{href}' target='_blank' onclick=\"makeDliblog('{log_base}?url={click_url}','1')\">{title}</a>\n",
            href = escape(record.fallback_url.trim()),
            log_base = click_log_base,
            click_url = escape(record.click_url.trim()),
            title = escape(record.title.trim()),
        ));
        if record.year_value() > 0 {
            html.push_str(&format!(
                "<span class='mdl-year'>({})</span>\n",
                record.year_value()
            ));
        }
        html.push_str("</div>\n");
        if !record.published_in.trim().is_empty() {
            html.push_str(&format!(
                "<span class='mdl-journal'>In: {}.</span>\n",
                escape(record.published_in.trim())
            ));
        }
        html.push_str("</li>\n<hr>\n");
    }

    html.push_str("</ul>\n</fieldset>\n</body>\n</html>\n");
    html
}

/// Inline error text emitted when the payload cannot be read as XML.
pub fn render_parse_failure(detail: &str) -> String {
    format!("Failed loading recommendations: <br>{}", escape(detail))
}
