use crate::mcp::errors::ToolError;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract(path: &Path) -> Result<String, ToolError> {
    let fail = |reason: String| ToolError::ParseFailure {
        format: "Word document",
        path: path.display().to_string(),
        reason,
    };

    let file = super::open(path, "Word document")?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| fail(format!("not a docx archive: {err}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|err| fail(format!("missing {DOCUMENT_PART}: {err}")))?
        .read_to_string(&mut xml)
        .map_err(|err| fail(format!("failed to read {DOCUMENT_PART}: {err}")))?;

    document_text(&xml).map_err(fail)
}

/// Pulls the visible text out of a WordprocessingML body: runs are
/// concatenated, tabs and breaks inside runs are kept, paragraphs are
/// separated by newlines. Only the newline closing the final paragraph is
/// dropped.
pub fn document_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text = false;
    let mut ends_with_paragraph = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|err| format!("invalid {DOCUMENT_PART}: {err}"))?;
        match event {
            Event::Start(element) => match element.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(element) => match element.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                b"w:p" => {
                    text.push('\n');
                    ends_with_paragraph = true;
                }
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"w:tab" if in_run => {
                    text.push('\t');
                    ends_with_paragraph = false;
                }
                b"w:br" | b"w:cr" if in_run => {
                    text.push('\n');
                    ends_with_paragraph = false;
                }
                b"w:p" => {
                    text.push('\n');
                    ends_with_paragraph = true;
                }
                _ => {}
            },
            Event::Text(content) if in_text => {
                let unescaped = content
                    .unescape()
                    .map_err(|err| format!("invalid text in {DOCUMENT_PART}: {err}"))?;
                text.push_str(&unescaped);
                ends_with_paragraph = false;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if ends_with_paragraph {
        text.pop();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::errors;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}</w:body></w:document>"#
        )
    }

    #[test]
    fn paragraphs_runs_and_tabs() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Hello</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve"> world</w:t></w:r></w:p><w:p><w:r><w:t>Tom &amp; Jerry</w:t><w:br/><w:t>next</w:t></w:r></w:p>"#,
        );
        let text = document_text(&xml).expect("text");
        assert_eq!(text, "Hello\t world\nTom & Jerry\nnext");
    }

    #[test]
    fn empty_paragraphs_keep_line_structure() {
        let xml = body(r#"<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>b</w:t></w:r></w:p>"#);
        assert_eq!(document_text(&xml).expect("text"), "a\n\nb");
    }

    #[test]
    fn trailing_break_inside_last_paragraph_is_kept() {
        let xml = body(r#"<w:p><w:r><w:t>a</w:t><w:br/></w:r></w:p>"#);
        assert_eq!(document_text(&xml).expect("text"), "a\n");
    }

    #[test]
    fn section_properties_after_last_paragraph() {
        let xml = body(r#"<w:p><w:r><w:t>end</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906"/></w:sectPr>"#);
        assert_eq!(document_text(&xml).expect("text"), "end");
    }

    #[test]
    fn malformed_xml_is_error() {
        assert!(document_text("<w:document><w:body></w:document>").is_err());
    }

    #[test]
    fn reads_archive() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("letter.docx");
        let file = File::create(&path).expect("file");
        let mut writer = ZipWriter::new(file);
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .expect("start");
        writer
            .write_all(body(r#"<w:p><w:r><w:t>Dear reader</w:t></w:r></w:p>"#).as_bytes())
            .expect("write");
        writer.finish().expect("finish");

        assert_eq!(extract(&path).expect("text"), "Dear reader");
    }

    #[test]
    fn archive_without_document_is_parse_failure() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("empty.docx");
        let file = File::create(&path).expect("file");
        let mut writer = ZipWriter::new(file);
        writer
            .start_file("other.xml", SimpleFileOptions::default())
            .expect("start");
        writer.write_all(b"<x/>").expect("write");
        writer.finish().expect("finish");

        let err = extract(&path).expect_err("error");
        assert_eq!(err.kind(), errors::PARSE_FAILED);
        assert!(err.to_string().contains(DOCUMENT_PART));
    }

    #[test]
    fn plain_bytes_are_parse_failure() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"not a zip").expect("write");
        let err = extract(&path).expect_err("error");
        assert_eq!(err.kind(), errors::PARSE_FAILED);
    }
}
