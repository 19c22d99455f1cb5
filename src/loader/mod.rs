//! PDF document loading
//!
//! Walks a directory for PDF files and extracts their text one page at a
//! time. Each page keeps the path of its source file and its zero-based
//! page number so chunks can be traced back to where they came from.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Where a page of text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Path of the source PDF as reached from the loaded directory
    pub source: String,

    /// Zero-based page number within the source
    pub page: usize,
}

/// Extracted text of a single PDF page
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub text: String,
    pub metadata: PageMetadata,
}

impl PageDocument {
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: usize) -> Self {
        Self {
            text: text.into(),
            metadata: PageMetadata {
                source: source.into(),
                page,
            },
        }
    }
}

/// Load every page of every PDF under `dir`, in path order
pub fn load_pdf_directory(dir: &Path) -> Result<Vec<PageDocument>> {
    info!("Loading PDFs from {}", dir.display());

    if !dir.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a readable directory",
            dir.display()
        )));
    }

    let files = find_pdf_files(dir)?;
    debug!("Found {} PDF files", files.len());

    let mut pages = Vec::new();
    for file in &files {
        let file_pages = load_pdf_file(file)?;
        debug!("{}: {} pages", file.display(), file_pages.len());
        pages.extend(file_pages);
    }

    info!("Loaded {} pages from {} files", pages.len(), files.len());
    Ok(pages)
}

/// Extract the pages of a single PDF file
pub fn load_pdf_file(path: &Path) -> Result<Vec<PageDocument>> {
    let bytes = std::fs::read(path)?;
    let page_texts = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| Error::Parse(format!("Failed to extract text from {}: {}", path.display(), e)))?;

    let source = path.display().to_string();
    Ok(page_texts
        .into_iter()
        .enumerate()
        .map(|(page, text)| PageDocument::new(text, source.clone(), page))
        .collect())
}

/// Recursively collect `.pdf` files sorted by path.
///
/// Hidden files and anything below a hidden directory are skipped; the root
/// itself is always walked.
pub fn find_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_name(entry.file_name()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_pdf_path(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_hidden_name(name: &OsStr) -> bool {
    name.to_str().map_or(true, |n| n.starts_with('.'))
}

fn is_pdf_path(path: &Path) -> bool {
    if path.file_name().map_or(true, is_hidden_name) {
        return false;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Minimal uncompressed PDF with one line of Helvetica text per page
#[cfg(test)]
pub(crate) fn two_page_pdf(first: &str, second: &str) -> Vec<u8> {
    let content = |text: &str| format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", text);
    let page = |contents: usize| {
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents {} 0 R >>",
            contents
        )
    };
    let stream = |body: String| format!("<< /Length {} >>\nstream\n{}\nendstream", body.len(), body);

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >>".to_string(),
        page(6),
        page(7),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        stream(content(first)),
        stream(content(second)),
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}
