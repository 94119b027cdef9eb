//! Recommendation records and XML payload parsing.
//!
//! The API answers with a `related_articles` collection of
//! `related_article` elements. Parsing pulls each element's children into
//! a flat record; element order is preserved.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Payload parsing failure.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document ended before all elements were closed")]
    Truncated,
}

/// One related-document record, scoped to a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recommendation {
    /// Raw comma-separated author string, as returned by the API.
    pub authors: String,
    pub title: String,
    pub abstract_text: String,
    pub published_in: String,
    /// Click-through URL routed via the API (logs the click upstream).
    pub click_url: String,
    /// Direct URL used when click routing is not wanted.
    pub fallback_url: String,
    /// Publication year as delivered; not guaranteed numeric.
    pub year: String,
}

impl Recommendation {
    /// Numeric publication year; unparseable or absent values count as 0.
    pub fn year_value(&self) -> i64 {
        self.year.trim().parse().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Authors,
    Title,
    Abstract,
    PublishedIn,
    ClickUrl,
    FallbackUrl,
    Year,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"authors" => Some(Field::Authors),
            b"title" => Some(Field::Title),
            b"abstract" => Some(Field::Abstract),
            b"published_in" => Some(Field::PublishedIn),
            b"click_url" => Some(Field::ClickUrl),
            b"fallback_url" => Some(Field::FallbackUrl),
            b"year" => Some(Field::Year),
            _ => None,
        }
    }
}

fn field_mut<'a>(rec: &'a mut Recommendation, field: Field) -> &'a mut String {
    match field {
        Field::Authors => &mut rec.authors,
        Field::Title => &mut rec.title,
        Field::Abstract => &mut rec.abstract_text,
        Field::PublishedIn => &mut rec.published_in,
        Field::ClickUrl => &mut rec.click_url,
        Field::FallbackUrl => &mut rec.fallback_url,
        Field::Year => &mut rec.year,
    }
}

/// Parse an API payload into recommendation records.
///
/// Elements outside the known field set are skipped; CDATA and entity-
/// escaped text both land as plain text on the record. A document that
/// ends with open elements is a parse failure, not a short result.
pub fn parse_related_articles(xml: &str) -> Result<Vec<Recommendation>, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut recommendations = Vec::new();
    let mut current: Option<Recommendation> = None;
    let mut field: Option<Field> = None;
    let mut depth: usize = 0;

    loop {
        match reader.read_event().map_err(quick_xml::Error::from)? {
            Event::Start(start) => {
                depth += 1;
                match start.local_name().as_ref() {
                    b"related_article" => {
                        current = Some(Recommendation::default());
                        field = None;
                    }
                    name => {
                        if current.is_some() {
                            field = Field::from_name(name);
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let (Some(rec), Some(field)) = (current.as_mut(), field) {
                    let text = text.unescape().map_err(quick_xml::Error::from)?;
                    field_mut(rec, field).push_str(&text);
                }
            }
            Event::CData(cdata) => {
                if let (Some(rec), Some(field)) = (current.as_mut(), field) {
                    field_mut(rec, field).push_str(&String::from_utf8_lossy(cdata.as_ref()));
                }
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                match end.local_name().as_ref() {
                    b"related_article" => {
                        if let Some(rec) = current.take() {
                            recommendations.push(rec);
                        }
                        field = None;
                    }
                    _ => field = None,
                }
            }
            Event::Eof => {
                if depth > 0 {
                    return Err(ParseError::Truncated);
                }
                break;
            }
            _ => {}
        }
    }

    Ok(recommendations)
}
