//! Reference and link extraction from raw message payloads.
//!
//! The clustering stages only see the [`PayloadParser`] trait. The default
//! [`XmlPayloadParser`] understands chat-export XML: a structured pass with
//! quick-xml, then a permissive regex pass when the structured one finds
//! nothing or the payload is not well-formed. A malformed payload where the
//! regex pass also comes up empty is reported as [`TopicsError::Payload`].

use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;

use chat_types::LinkInfo;

use crate::error::TopicsError;

/// Prefix the export normalizer puts in front of server message ids.
pub const DEFAULT_QUOTED_ID_PREFIX: &str = "svrid_";

/// Extracts quote references and link cards from raw payloads.
pub trait PayloadParser: Send + Sync {
    /// Id of the message quoted by this payload, if any.
    fn quoted_message_id(&self, payload: &str) -> Result<Option<String>, TopicsError>;

    /// Link card carried by this payload, if any.
    fn link_info(&self, payload: &str) -> Result<Option<LinkInfo>, TopicsError>;
}

/// Parser for chat-export XML payloads.
///
/// Quotes look like `<refermsg><svrid>123</svrid>...</refermsg>` and link
/// shares like `<appmsg><title/><des/><url/></appmsg>`.
#[derive(Debug, Clone)]
pub struct XmlPayloadParser {
    id_prefix: String,
}

impl XmlPayloadParser {
    pub fn new() -> Self {
        Self {
            id_prefix: DEFAULT_QUOTED_ID_PREFIX.to_string(),
        }
    }

    /// Use a different prefix when mapping `svrid` values to message ids.
    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: prefix.into(),
        }
    }

    fn quoted_id(&self, svrid: &str) -> String {
        format!("{}{}", self.id_prefix, svrid)
    }
}

impl Default for XmlPayloadParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadParser for XmlPayloadParser {
    /// A malformed payload falls back to the pattern pass and is an error
    /// only when that finds nothing either.
    fn quoted_message_id(&self, payload: &str) -> Result<Option<String>, TopicsError> {
        let structured = if payload.contains("<refermsg>") {
            structured_svrid(payload)
        } else {
            Ok(None)
        };
        if let Ok(Some(svrid)) = &structured {
            return Ok(Some(self.quoted_id(svrid)));
        }

        let fallback = svrid_pattern()
            .captures(payload)
            .map(|caps| self.quoted_id(&caps[1]));
        match (fallback, structured) {
            (None, Err(e)) => Err(e),
            (fallback, _) => Ok(fallback),
        }
    }

    fn link_info(&self, payload: &str) -> Result<Option<LinkInfo>, TopicsError> {
        let structured = if payload.contains("<appmsg") {
            structured_link(payload)
        } else {
            Ok(None)
        };
        if let Ok(Some(_)) = &structured {
            return structured;
        }

        let capture = |re: &Regex| re.captures(payload).map(|caps| caps[1].to_string());
        let (title_re, des_re, url_re) = link_patterns();
        let fallback = LinkInfo::from_parts(capture(title_re), capture(des_re), capture(url_re));
        match (fallback, structured) {
            (None, Err(e)) => Err(e),
            (fallback, _) => Ok(fallback),
        }
    }
}

fn svrid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<svrid>(\d+)</svrid>").expect("static svrid pattern"))
}

fn link_patterns() -> (&'static Regex, &'static Regex, &'static Regex) {
    static PATTERNS: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    let (title, des, url) = PATTERNS.get_or_init(|| {
        (
            Regex::new(r"<title>([^<]+)</title>").expect("static title pattern"),
            Regex::new(r"<des>([^<]+)</des>").expect("static des pattern"),
            Regex::new(r"<url>([^<]+)</url>").expect("static url pattern"),
        )
    });
    (title, des, url)
}

/// Wrap the payload in a synthetic root so fragments parse as one document.
///
/// A leading XML declaration is dropped; it may not appear inside an element.
fn wrapped(payload: &str) -> String {
    let mut body = payload.trim_start();
    if body.starts_with("<?xml") {
        if let Some(end) = body.find("?>") {
            body = &body[end + 2..];
        }
    }
    format!("<root>{}</root>", body)
}

/// Walk the whole document and call `on_text` with the open-element path
/// for each text node.
///
/// The walk always reaches the end, so a malformed document is an error
/// even when the interesting text came first.
fn walk_text<F>(payload: &str, mut on_text: F) -> Result<(), TopicsError>
where
    F: FnMut(&[String], &str),
{
    let document = wrapped(payload);
    let mut reader = Reader::from_str(&document);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                on_text(&path, text.trim());
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                on_text(&path, text.trim());
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

fn structured_svrid(payload: &str) -> Result<Option<String>, TopicsError> {
    let mut found = None;
    walk_text(payload, |path, text| {
        let in_refermsg = path.iter().any(|name| name == "refermsg");
        if found.is_none()
            && in_refermsg
            && path.last().map(String::as_str) == Some("svrid")
            && !text.is_empty()
        {
            found = Some(text.to_string());
        }
    })?;
    Ok(found)
}

fn structured_link(payload: &str) -> Result<Option<LinkInfo>, TopicsError> {
    let mut title = None;
    let mut description = None;
    let mut url = None;
    // Only direct children of the first <appmsg> count.
    let mut appmsg_depth: Option<usize> = None;
    let mut left_appmsg = false;

    walk_text(payload, |path, text| {
        if left_appmsg {
            return;
        }
        if appmsg_depth.is_none() {
            appmsg_depth = path.iter().position(|name| name == "appmsg");
        }
        let Some(depth) = appmsg_depth else {
            return;
        };
        if path.len() < depth + 1 || path[depth] != "appmsg" {
            left_appmsg = true;
            return;
        }
        if path.len() != depth + 2 || text.is_empty() {
            return;
        }
        let slot = match path[depth + 1].as_str() {
            "title" => &mut title,
            "des" => &mut description,
            "url" => &mut url,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    })?;

    Ok(LinkInfo::from_parts(title, description, url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_structured() {
        let parser = XmlPayloadParser::new();
        let payload = "<msg><appmsg><title>reply text</title><refermsg><type>1</type>\
                       <svrid>8812345</svrid><displayname>Bob</displayname></refermsg>\
                       </appmsg></msg>";
        let quoted = parser.quoted_message_id(payload).unwrap();
        assert_eq!(quoted.as_deref(), Some("svrid_8812345"));
    }

    #[test]
    fn test_quote_fallback_on_malformed_xml() {
        let parser = XmlPayloadParser::new();
        // Mismatched closing tag makes the structured pass fail before the svrid.
        let payload = "<msg><refermsg><content>x</msg><svrid>42</svrid></refermsg>";
        let quoted = parser.quoted_message_id(payload).unwrap();
        assert_eq!(quoted.as_deref(), Some("svrid_42"));
    }

    #[test]
    fn test_quote_fallback_without_refermsg_block() {
        let parser = XmlPayloadParser::new();
        let quoted = parser.quoted_message_id("<svrid>7</svrid>").unwrap();
        assert_eq!(quoted.as_deref(), Some("svrid_7"));
    }

    #[test]
    fn test_quote_absent() {
        let parser = XmlPayloadParser::new();
        assert!(parser.quoted_message_id("plain text").unwrap().is_none());
        assert!(parser.quoted_message_id("").unwrap().is_none());
        assert!(parser
            .quoted_message_id("<refermsg><type>1</type></refermsg>")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_quote_custom_prefix() {
        let parser = XmlPayloadParser::with_id_prefix("");
        let quoted = parser
            .quoted_message_id("<refermsg><svrid>99</svrid></refermsg>")
            .unwrap();
        assert_eq!(quoted.as_deref(), Some("99"));
    }

    #[test]
    fn test_link_structured_with_cdata_and_entities() {
        let parser = XmlPayloadParser::new();
        let payload = "<msg><appmsg appid=\"\"><title><![CDATA[Rust 1.80 released]]></title>\
                       <des>Highlights &amp; notes</des>\
                       <url>https://blog.rust-lang.org/?a=1&amp;b=2</url></appmsg></msg>";
        let link = parser.link_info(payload).unwrap().unwrap();
        assert_eq!(link.title.as_deref(), Some("Rust 1.80 released"));
        assert_eq!(link.description.as_deref(), Some("Highlights & notes"));
        assert_eq!(link.url.as_deref(), Some("https://blog.rust-lang.org/?a=1&b=2"));
    }

    #[test]
    fn test_link_with_declaration_and_empty_elements() {
        let parser = XmlPayloadParser::new();
        let payload = "\n<?xml version=\"1.0\"?>\n<msg>\n\t<appmsg appid=\"\" sdkver=\"0\">\n\
                       \t\t<title>Alice的聊天记录</title>\n\t\t<des>Alice: [链接] GitHub</des>\n\
                       \t\t<type>19</type>\n\t\t<url />\n\t</appmsg>\n\
                       \t<fromusername>wxid_alice</fromusername>\n</msg>\n";
        let link = parser.link_info(payload).unwrap().unwrap();
        assert_eq!(link.title.as_deref(), Some("Alice的聊天记录"));
        assert_eq!(link.description.as_deref(), Some("Alice: [链接] GitHub"));
        assert!(link.url.is_none());
    }

    #[test]
    fn test_wrapped_strips_declaration() {
        assert_eq!(
            wrapped("  <?xml version=\"1.0\"?><msg/>"),
            "<root><msg/></root>"
        );
        assert_eq!(wrapped("<msg/>"), "<root><msg/></root>");
    }

    #[test]
    fn test_link_ignores_nested_titles() {
        let parser = XmlPayloadParser::new();
        let payload = "<msg><appmsg><url>https://example.com</url>\
                       <refermsg><title>quoted title</title></refermsg></appmsg></msg>";
        let link = parser.link_info(payload).unwrap().unwrap();
        assert_eq!(link.url.as_deref(), Some("https://example.com"));
        assert!(link.title.is_none());
    }

    #[test]
    fn test_link_regex_fallback() {
        let parser = XmlPayloadParser::new();
        let payload = "<title>Loose title</title><url>https://example.org</url>";
        let link = parser.link_info(payload).unwrap().unwrap();
        assert_eq!(link.title.as_deref(), Some("Loose title"));
        assert_eq!(link.url.as_deref(), Some("https://example.org"));
        assert!(link.description.is_none());
    }

    #[test]
    fn test_malformed_payload_without_match_is_error() {
        let parser = XmlPayloadParser::new();

        // The svrid text comes before the mismatched close tag.
        let quoted = parser.quoted_message_id("<msg><refermsg><svrid>1</msg>");
        assert!(matches!(quoted, Err(TopicsError::Payload(_))));

        let link = parser.link_info("<msg><appmsg><title>broken");
        assert!(matches!(link, Err(TopicsError::Payload(_))));
    }

    #[test]
    fn test_malformed_payload_without_markers_is_absent() {
        let parser = XmlPayloadParser::new();
        // Neither pass is attempted structurally without the element markers.
        assert!(parser.quoted_message_id("<msg><title>x</msg>").unwrap().is_none());
        assert!(parser.link_info("<msg><des>x</msg>").unwrap().is_none());
    }

    #[test]
    fn test_link_requires_title_or_url() {
        let parser = XmlPayloadParser::new();
        assert!(parser
            .link_info("<appmsg><des>only a description</des></appmsg>")
            .unwrap()
            .is_none());
        assert!(parser.link_info("no xml here").unwrap().is_none());
    }
}
