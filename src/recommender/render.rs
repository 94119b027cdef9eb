//! Widget HTML generation.
//!
//! Rendering is a pure function from normalized records and the display
//! variant to the embeddable fragment: normalization happens when a
//! `RenderedRecommendation` is built, emission only concatenates. Nothing
//! is written out until the whole fragment exists, so a fatal lookup error
//! never leaks partial HTML.

use crate::recommender::model::Recommendation;
use crate::recommender::normalize::{author_line, normalize};

/// Display variant selected by the user identifier's parity.
///
/// Odd identifiers get the advanced variant: the alternate style sheet and
/// per-recommendation click logging. Even or absent identifiers get the
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayVariant {
    pub style_sheet: &'static str,
    pub log_clicks: bool,
}

impl DisplayVariant {
    const BASELINE: Self = Self {
        style_sheet: "mediatum-1.css",
        log_clicks: false,
    };

    const ADVANCED: Self = Self {
        style_sheet: "mediatum-2.css",
        log_clicks: true,
    };

    /// Deterministic A/B split on the user identifier, modulo 2.
    pub fn for_user(user: Option<u64>) -> Self {
        match user {
            Some(id) if id % 2 == 1 => Self::ADVANCED,
            _ => Self::BASELINE,
        }
    }
}

/// One recommendation with every field normalized and escape-safe for
/// direct embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecommendation {
    pub authors: String,
    pub title: String,
    pub abstract_text: String,
    pub published_in: String,
    pub click_url: String,
}

impl RenderedRecommendation {
    pub fn from_record(record: &Recommendation) -> Self {
        Self {
            authors: author_line(&record.authors),
            title: normalize(&record.title),
            abstract_text: normalize(&record.abstract_text),
            published_in: normalize(&record.published_in),
            click_url: normalize(&record.click_url),
        }
    }
}

/// Render the full embeddable fragment: style-sheet link, header, the
/// recommendation list, and the footer controls.
pub fn render_fragment(variant: DisplayVariant, items: &[RenderedRecommendation]) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<link rel=\"stylesheet\" href=\"{}\">\n",
        variant.style_sheet
    ));
    html.push_str("<div id=\"mrdlib_header\">&Auml;hnliche Publikationen</div>\n");
    html.push_str("<div id=\"mrdlib_body\">\n<ul>\n");
    for item in items {
        html.push_str(&render_item(variant, item));
    }
    html.push_str("</ul>\n</div>\n");
    html.push_str(FOOTER);

    html
}

/// One `<li>`: two alternate anchors around the same meta block (the CSS
/// decides which link target is shown), then the abstract tooltip.
fn render_item(variant: DisplayVariant, item: &RenderedRecommendation) -> String {
    let onclick = if variant.log_clicks {
        format!(" onclick=\"log_click('{}');\"", item.title)
    } else {
        String::new()
    };

    let meta = format!(
        "<div id=\"mrdlib_recommendation_author\">{}</div>\
         <div id=\"mrdlib_recommendation_title\">{}</div>\
         <div id=\"mrdlib_recommendation_publishedIn\">{}</div>",
        item.authors, item.title, item.published_in
    );

    format!(
        "<li>\n\
         <a id=\"mrdlib_link_same_tab\" href=\"{href}\"{onclick}>{meta}</a>\n\
         <a id=\"mrdlib_link_new_tab\" href=\"{href}\" target=\"_blank\"{onclick}>{meta}</a>\n\
         <div class=\"tooltip\">\n\
         <div id=\"mrdlib_info_icon\">i</div>\n\
         <span class=\"tooltiptext\">{tooltip}</span>\n\
         </div>\n\
         </li>\n",
        href = item.click_url,
        onclick = onclick,
        meta = meta,
        tooltip = item.abstract_text,
    )
}

const FOOTER: &str = "<div id=\"mrdlib_footer\">\n\
  <form id=\"mrdlib_advanced_recommendations_form\" onsubmit=\"update_cookie_setting();\">\n\
    <input type=\"checkbox\" name=\"mrdlib_advanced_recommendations\" value=\"mrdlib_advanced_recommendations_enabled\" /><span id=\"mrdlib_advanced_recommendations_caption\"> Enable advanced recommendations. This will set a cookie that allows personalizing your recommendations.</span>\n\
    <input type=\"submit\" value=\"Submit\">\n\
  </form>\n\
  <a href=\"http://mr-dlib.org/\">Powered by <img src=\"mdl_logo.gif\" alt=\"Mr. DLib: Recommendations-as-a-service for Academia\"></a>\n\
  <button id=\"mrdlib_refresh_button\" onclick=\"get_rec()\">Refresh</button>\n\
</div>\n";
