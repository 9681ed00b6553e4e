//! Multi-format text extraction for indexed documents.
//!
//! Dispatches a file path to a format-specific extractor by extension and
//! returns plain UTF-8 text. Supported formats: plain text, PDF, DOCX,
//! and ODT (the latter two are ZIP+XML office containers). An unknown
//! extension is a defined miss-case, not an error; extraction failures
//! are returned to the caller, which warns and moves on to the next file.

use std::io::Read;
use std::path::Path;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb
/// protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Document format selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Pdf,
    Docx,
    Odt,
}

impl DocumentFormat {
    /// Extension table. Returns `None` for extensions with no extractor.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(DocumentFormat::Text),
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "odt" => Some(DocumentFormat::Odt),
            _ => None,
        }
    }
}

/// Extraction error. One bad file never aborts a run; the pipeline warns
/// and skips the item.
#[derive(Debug)]
pub enum ExtractError {
    Io(String),
    Pdf(String),
    Office(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Io(e) => write!(f, "read failed: {}", e),
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Office(e) => write!(f, "office document extraction failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract plain text from a file using the given format's extractor.
pub fn extract_file(path: &Path, format: DocumentFormat) -> Result<String, ExtractError> {
    match format {
        DocumentFormat::Text => extract_txt(path),
        DocumentFormat::Pdf => {
            let bytes = read_bytes(path)?;
            extract_pdf(&bytes)
        }
        DocumentFormat::Docx => {
            let bytes = read_bytes(path)?;
            extract_docx(&bytes)
        }
        DocumentFormat::Odt => {
            let bytes = read_bytes(path)?;
            extract_odt(&bytes)
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ExtractError> {
    std::fs::read(path).map_err(|e| ExtractError::Io(format!("{}: {}", path.display(), e)))
}

/// Plain-text read. Invalid UTF-8 bytes are replaced, not fatal.
fn extract_txt(path: &Path) -> Result<String, ExtractError> {
    let bytes = read_bytes(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn read_zip_entry_bounded(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, ExtractError> {
    let entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::Office(format!("{}: {}", name, e)))?;
    let mut out = Vec::new();
    entry
        .take(max_bytes)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Office(e.to_string()))?;
    if out.len() as u64 >= max_bytes {
        return Err(ExtractError::Office(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, max_bytes
        )));
    }
    Ok(out)
}

/// DOCX: text runs live in `w:t` elements inside `w:p` paragraphs of
/// `word/document.xml`. Paragraph ends become newlines.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Office(e.to_string()))?;
    let xml = read_zip_entry_bounded(&mut archive, "word/document.xml", MAX_XML_ENTRY_BYTES)?;
    paragraph_text(&xml, b"t", b"p")
}

/// ODT: paragraph text lives in `text:p` (and `text:h` heading) elements
/// of `content.xml`, possibly nested in spans.
fn extract_odt(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Office(e.to_string()))?;
    let xml = read_zip_entry_bounded(&mut archive, "content.xml", MAX_XML_ENTRY_BYTES)?;
    odt_paragraph_text(&xml)
}

/// Walk an OOXML body collecting text inside `text_el` elements, emitting
/// a newline at the end of each `para_el`.
fn paragraph_text(xml: &[u8], text_el: &[u8], para_el: &[u8]) -> Result<String, ExtractError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == text_el {
                    in_text = true;
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if in_text => {
                out.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == text_el {
                    in_text = false;
                } else if e.local_name().as_ref() == para_el {
                    out.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Office(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    // Drop the trailing paragraph newline
    while out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// Walk ODT content collecting direct text of paragraphs and headings.
/// Unlike OOXML there is no dedicated text-run element: character data
/// appears directly inside `text:p`/`text:h` (and nested spans).
fn odt_paragraph_text(xml: &[u8]) -> Result<String, ExtractError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut para_depth = 0usize;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"p" || name.as_ref() == b"h" {
                    para_depth += 1;
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if para_depth > 0 => {
                out.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"p" || name.as_ref() == b"h" {
                    para_depth = para_depth.saturating_sub(1);
                    out.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Office(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    while out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}
