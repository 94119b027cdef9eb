//! Text normalization for rendered recommendation fields.

use quick_xml::escape::escape;

/// Trim, strip stray CDATA markers, and HTML-escape special characters.
///
/// Some payload fields arrive with their CDATA wrapper escaped into the
/// text itself; the literal markers are dropped before escaping.
pub fn normalize(raw: &str) -> String {
    let stripped = raw.trim().replace("<![CDATA[", "").replace("]]>", "");
    escape(stripped.as_str()).into_owned()
}

/// Normalize an author name of the form "[first name] [last name]".
///
/// An abbreviated first name (a single character) gets a period appended
/// to that token only.
pub fn normalize_author(raw: &str) -> String {
    let mut name = normalize(raw);

    let first_len = name
        .find(char::is_whitespace)
        .unwrap_or(name.len());
    if name[..first_len].chars().count() == 1 {
        name.insert(first_len, '.');
    }

    name
}

/// Render the author line from the raw comma-separated author string:
/// at most the first two names, then a literal "et al." marker.
pub fn author_line(raw_authors: &str) -> String {
    let mut names = raw_authors.split(',');

    let mut line = normalize_author(names.next().unwrap_or(""));
    if let Some(second) = names.next() {
        line.push_str(", ");
        line.push_str(&normalize_author(second));
    }
    if names.next().is_some() {
        line.push_str(" et al.");
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_escapes() {
        assert_eq!(normalize("  plain  "), "plain");
        assert_eq!(normalize("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(normalize(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_normalize_strips_cdata_markers() {
        let out = normalize("<![CDATA[wrapped text]]>");
        assert_eq!(out, "wrapped text");
        assert!(!out.contains("<![CDATA["));
        assert!(!out.contains("]]>"));
    }

    #[test]
    fn test_abbreviated_first_name_gets_period() {
        assert_eq!(normalize_author("J Smith"), "J. Smith");
        // the period lands after the first token and nowhere else
        assert_eq!(normalize_author("J Jones"), "J. Jones");
        assert_eq!(normalize_author("Jane Smith"), "Jane Smith");
        assert_eq!(normalize_author("  J Smith  "), "J. Smith");
    }

    #[test]
    fn test_single_token_names() {
        assert_eq!(normalize_author("X"), "X.");
        assert_eq!(normalize_author("Madonna"), "Madonna");
        assert_eq!(normalize_author(""), "");
    }

    #[test]
    fn test_author_line_truncation() {
        assert_eq!(author_line("A Smith"), "A. Smith");
        assert_eq!(author_line("A Smith,Bo Jones"), "A. Smith, Bo Jones");

        let line = author_line("A Smith,Bo Jones,Cy Miller,Di Brown");
        assert_eq!(line, "A. Smith, Bo Jones et al.");
        assert!(line.ends_with("et al."));
        assert!(!line.contains("Miller"));
        assert!(!line.contains("Brown"));
    }
}
