use crate::mcp::errors::ToolError;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, warn};

pub fn extract(path: &Path) -> Result<String, ToolError> {
    let file = super::open(path, "PDF")?;
    let document = Document::load_from(file).map_err(|err| ToolError::ParseFailure {
        format: "PDF",
        path: path.display().to_string(),
        reason: format!("failed to load PDF: {err}"),
    })?;

    let pages = document.get_pages();
    let total = u32::try_from(pages.len()).unwrap_or(u32::MAX);
    let joined = join_pages(total, |number| {
        if !pages.contains_key(&number) {
            return None;
        }
        match document.extract_text(&[number]) {
            Ok(text) => Some(text),
            Err(err) => {
                debug!(page = number, error = %err, "skipping unreadable pdf page");
                None
            }
        }
    });

    if joined.skipped > 0 {
        warn!(
            path = %path.display(),
            skipped = joined.skipped,
            total,
            "pdf pages could not be read"
        );
    }
    Ok(joined.text)
}

#[derive(Debug, PartialEq)]
pub struct JoinedPages {
    pub text: String,
    pub skipped: usize,
}

/// Concatenates pages `1..=total` in order. A page for which `page_text`
/// yields nothing is skipped. Consecutive readable pages are joined by a
/// `--- Page N ---` separator naming the earlier one, so nothing follows the
/// last readable page.
pub fn join_pages(total: u32, mut page_text: impl FnMut(u32) -> Option<String>) -> JoinedPages {
    let mut text = String::new();
    let mut skipped = 0;
    let mut previous = None;
    for number in 1..=total {
        let Some(page) = page_text(number) else {
            skipped += 1;
            continue;
        };
        if let Some(previous) = previous {
            text.push_str(&format!("\n\n--- Page {previous} ---\n\n"));
        }
        text.push_str(&page);
        previous = Some(number);
    }
    JoinedPages { text, skipped }
}
