//! Text extraction from `efetch` XML documents.

use std::borrow::Cow;

use quick_xml::events::{BytesText, Event};
use quick_xml::reader::Reader;

use super::client::EutilsError;

/// Concatenate every text node under the first `<body>` element, whitespace-joined.
///
/// Returns an empty string when the document has no body (PMC withholds it
/// for articles whose publisher disallows XML redistribution).
pub fn extract_body_text(xml: &str) -> Result<String, EutilsError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut parts: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth > 0 {
                    depth += 1;
                } else if e.local_name().as_ref() == b"body" {
                    depth = 1;
                }
            }
            Ok(Event::End(_)) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Text(t)) if depth > 0 => push_trimmed(&mut parts, &text_of(&t)),
            Ok(Event::CData(c)) if depth > 0 => {
                push_trimmed(&mut parts, &String::from_utf8_lossy(&c))
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, e)),
            _ => {}
        }
    }

    Ok(parts.join(" "))
}

/// Text content of the first `<AbstractText>` element, or empty if there is none.
///
/// Inline markup (`<i>`, `<sup>`) is flattened into the surrounding text.
pub fn extract_abstract_text(xml: &str) -> Result<String, EutilsError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth > 0 {
                    depth += 1;
                } else if e.local_name().as_ref() == b"AbstractText" {
                    depth = 1;
                }
            }
            Ok(Event::End(_)) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Text(t)) if depth > 0 => text.push_str(&text_of(&t)),
            Ok(Event::CData(c)) if depth > 0 => text.push_str(&String::from_utf8_lossy(&c)),
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(&reader, e)),
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}

/// Unescaped text, falling back to the raw bytes for entities XML does not
/// predefine (`&nbsp;` shows up in some PMC bodies).
fn text_of<'a>(t: &'a BytesText<'a>) -> Cow<'a, str> {
    t.unescape()
        .unwrap_or_else(|_| String::from_utf8_lossy(t))
}

fn push_trimmed(parts: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

fn xml_error(reader: &Reader<&[u8]>, e: quick_xml::Error) -> EutilsError {
    EutilsError::Xml(format!("at position {}: {e}", reader.buffer_position()))
}
