//! Plain-text extraction from DOCX files.
//!
//! A DOCX file is a zip archive; the body lives in `word/document.xml`.
//! Each `<w:p>` element is one paragraph and its visible text is the
//! concatenation of its `<w:t>` runs. Tabs and line breaks inside runs are kept,
//! paragraph properties (which also contain `<w:tab>` stop definitions) are
//! skipped, and paragraphs are joined with `\n` (empty ones included).

use std::io::{Read, Seek};

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("DOCX archive has no word/document.xml")]
    MissingDocument,
}

lazy_static! {
    static ref PARAGRAPH: Regex =
        Regex::new(r"(?s)<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*[^/>])?>.*?</w:p>").unwrap();
    static ref PARAGRAPH_PROPERTIES: Regex =
        Regex::new(r"(?s)<w:pPr(?:\s[^>]*)?/>|<w:pPr(?:\s[^>]*[^/>])?>.*?</w:pPr>").unwrap();
    static ref RUN_CONTENT: Regex = Regex::new(
        r"<w:t(?:\s[^>]*[^/>])?>([^<]*)</w:t>|<w:tab(?:\s[^>]*)?/>|<w:(?:br|cr)(?:\s[^>]*)?/>"
    )
    .unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").unwrap();
}

/// Extracts the paragraph text of a DOCX document.
pub fn extract_text<R: Read + Seek>(reader: R) -> Result<String, DocxError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut part = match archive.by_name(DOCUMENT_PART) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Err(DocxError::MissingDocument),
        Err(e) => return Err(e.into()),
    };

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;

    Ok(document_text(&xml))
}

/// Converts the XML of `word/document.xml` to plain text.
pub fn document_text(xml: &str) -> String {
    PARAGRAPH
        .find_iter(xml)
        .map(|p| paragraph_text(p.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraph_text(paragraph_xml: &str) -> String {
    let body = PARAGRAPH_PROPERTIES.replace_all(paragraph_xml, "");
    let mut text = String::new();
    for cap in RUN_CONTENT.captures_iter(&body) {
        match cap.get(1) {
            Some(run) => text.push_str(&decode_entities(run.as_str())),
            None if cap[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    text
}

fn decode_entities(raw: &str) -> String {
    ENTITY
        .replace_all(raw, |cap: &Captures| match &cap[1] {
            "amp" => "&".to_string(),
            "lt" => "<".to_string(),
            "gt" => ">".to_string(),
            "quot" => "\"".to_string(),
            "apos" => "'".to_string(),
            numeric => {
                let code = match numeric.strip_prefix("#x") {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => numeric[1..].parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| cap[0].to_string())
            }
        })
        .into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Builds DOCX bytes whose body contains one `<w:p>` per entry of `paragraphs`.
    pub(crate) fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        docx_from_document_xml(&wrap_body(&body))
    }

    pub(crate) fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        )
    }

    pub(crate) fn docx_from_document_xml(xml: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("[Content_Types].xml", FileOptions::default())
            .unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, FileOptions::default()).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_joined_with_newlines() {
        let bytes = docx_bytes(&["First paragraph.", "Second paragraph."]);
        let text = extract_text(Cursor::new(bytes)).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_runs_concatenated_within_paragraph() {
        let xml = wrap_body(
            r#"<w:p w:rsidR="00A1"><w:r><w:rPr><w:b/></w:rPr><w:t>Breach</w:t></w:r><w:r><w:t xml:space="preserve"> of contract</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_text(&xml), "Breach of contract");
    }

    #[test]
    fn test_empty_paragraphs_preserved() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>A</w:t></w:r></w:p><w:p/><w:p w:rsidR="1"/><w:p><w:r><w:t>B</w:t></w:r></w:p>"#);
        assert_eq!(document_text(&xml), "A\n\n\nB");
    }

    #[test]
    fn test_self_closing_paragraphs_with_attributes_keep_boundaries() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>Intro</w:t></w:r></w:p><w:p w:rsidR="00A1" w:rsidRDefault="00A1"/><w:p><w:r><w:t>Body</w:t></w:r></w:p><w:p w:rsidR="2" /><w:p><w:r><w:t>End</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_text(&xml), "Intro\n\nBody\n\nEnd");
    }

    #[test]
    fn test_self_closing_properties_and_text_are_skipped() {
        let xml = wrap_body(
            r#"<w:p><w:pPr w:rsidR="1"/><w:r><w:t xml:space="preserve"/><w:t>Kept</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_text(&xml), "Kept");
    }

    #[test]
    fn test_tabs_and_breaks_kept_but_tab_stops_ignored() {
        let xml = wrap_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Name</w:t><w:tab/><w:t>Value</w:t><w:br/><w:t>Next</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_text(&xml), "Name\tValue\nNext");
    }

    #[test]
    fn test_entities_decoded() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>Smith &amp; Jones &lt;LLP&gt; &#8212; &#x201C;Q&#x201D;</w:t></w:r></w:p>"#);
        assert_eq!(document_text(&xml), "Smith & Jones <LLP> \u{2014} \u{201C}Q\u{201D}");
    }

    #[test]
    fn test_table_cell_paragraphs_included() {
        let xml = wrap_body(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>After</w:t></w:r></w:p>"#,
        );
        assert_eq!(document_text(&xml), "Cell\nAfter");
    }

    #[test]
    fn test_not_a_zip_is_rejected() {
        let err = extract_text(Cursor::new(b"plain text, not a docx".to_vec())).unwrap_err();
        assert!(matches!(err, DocxError::Zip(_)));
    }

    #[test]
    fn test_zip_without_document_part_is_rejected() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("hello.txt", FileOptions::default()).unwrap();
        zip.write_all(b"hi").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = extract_text(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DocxError::MissingDocument));
    }
}
