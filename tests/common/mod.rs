#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const BIN: &str = env!("CARGO_BIN_EXE_mcp-doris-docs");

pub struct Server {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: BufReader<ChildStdout>,
}

impl Server {
    pub fn spawn(args: &[&str]) -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = Command::new(BIN)
            .args(args)
            .env("RUST_LOG", "off")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().expect("stdin available");
        let stdout = BufReader::new(child.stdout.take().expect("stdout available"));
        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    pub fn documents() -> Result<Self, Box<dyn std::error::Error>> {
        Self::spawn(&["serve", "documents", "--stdio"])
    }

    pub fn send(&mut self, request: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
        let serialized = serde_json::to_string(request)?;
        writeln!(self.stdin, "{serialized}")?;
        self.stdin.flush()?;
        Ok(())
    }

    pub fn read(&mut self) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        Ok(serde_json::from_str(line.trim())?)
    }

    pub fn request(
        &mut self,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        self.send(&request)?;
        self.read()
    }

    /// Reads `count` responses, which may arrive in any order, keyed by id.
    pub fn read_many(
        &mut self,
        count: usize,
    ) -> Result<HashMap<i64, serde_json::Value>, Box<dyn std::error::Error>> {
        let mut responses = HashMap::new();
        for _ in 0..count {
            let response = self.read()?;
            let id = response
                .get("id")
                .and_then(|value| value.as_i64())
                .expect("numeric id");
            responses.insert(id, response);
        }
        Ok(responses)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

pub fn call_tool(id: i64, name: &str, arguments: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {
            "name": name,
            "arguments": arguments
        }
    })
}

/// Writes a PDF with one page per entry of `pages`, each showing that text.
pub fn write_pdf(path: &Path, pages: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(24)],
                ),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(count),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}

/// Writes a minimal .docx whose body has one paragraph per entry.
pub fn write_docx(path: &Path, paragraphs: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
    let body: String = paragraphs
        .iter()
        .map(|text| format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>"))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let file = std::fs::File::create(path)?;
    let mut writer = ZipWriter::new(file);
    writer.start_file("[Content_Types].xml", SimpleFileOptions::default())?;
    writer.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)?;
    writer.start_file("word/document.xml", SimpleFileOptions::default())?;
    writer.write_all(document.as_bytes())?;
    writer.finish()?;
    Ok(())
}
