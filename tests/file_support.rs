//! Integration tests for multi-format file support.
//!
//! Builds minimal PDF, DOCX, and ODT fixtures in-test and asserts that
//! indexing extracts their text and retrieval finds it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ask_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.push("ask");
    path
}

fn setup_env() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::create_dir_all(root.join("config")).unwrap();
    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/vectordb/askdocs.sqlite"

[embedding]
provider = "mock"
dims = 256

[llm]
provider = "echo"
"#,
        root.display()
    );
    let config_path = root.join("config").join("askdocs.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path, docs_dir)
}

fn run_ask(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(ask_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ask: {}", e));
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Minimal valid PDF containing the text "vector ask check".
/// Builds body then xref with correct byte offsets so the page-text
/// extractor can parse it.
fn minimal_pdf_with_phrase() -> Vec<u8> {
    let stream: &[u8] = b"BT /F1 12 Tf 100 700 Td (vector ask check) Tj ET\n";
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(format!("4 0 obj << /Length {} >> stream\n", stream.len()).as_bytes());
    out.extend_from_slice(stream);
    out.extend_from_slice(b"endstream endobj\n");
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o1).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o2).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o3).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o4).as_bytes());
    out.extend_from_slice(format!("{:010} 00000 n \n", o5).as_bytes());
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

fn zip_with_entry(entry_name: &str, xml: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(entry_name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

/// Minimal DOCX (ZIP) with word/document.xml containing the phrase.
fn minimal_docx_with_phrase(phrase: &str) -> Vec<u8> {
    let xml = format!(
        "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
        phrase
    );
    zip_with_entry("word/document.xml", &xml)
}

/// Minimal ODT (ZIP) with content.xml containing the phrase.
fn minimal_odt_with_phrase(phrase: &str) -> Vec<u8> {
    let xml = format!(
        "<?xml version=\"1.0\"?><office:document-content xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\" xmlns:text=\"urn:oasis:names:tc:opendocument:xmlns:text:1.0\"><office:body><office:text><text:p>{}</text:p></office:text></office:body></office:document-content>",
        phrase
    );
    zip_with_entry("content.xml", &xml)
}

#[test]
fn test_pdf_indexes_and_is_searchable() {
    let (_tmp, config_path, docs) = setup_env();
    fs::write(docs.join("report.pdf"), minimal_pdf_with_phrase()).unwrap();

    let (stdout, stderr, success) = run_ask(&config_path, &["index", docs.to_str().unwrap()]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files indexed: 1"), "stdout={}", stdout);

    let (stdout, _, success) = run_ask(
        &config_path,
        &[
            "search",
            "vector ask check",
            "--path",
            docs.to_str().unwrap(),
        ],
    );
    assert!(success);
    assert!(
        stdout.contains("vector"),
        "expected the pdf text in results: {}",
        stdout
    );
}

#[test]
fn test_docx_indexes_and_is_searchable() {
    let (_tmp, config_path, docs) = setup_env();
    fs::write(
        docs.join("memo.docx"),
        minimal_docx_with_phrase("office ipsum marker"),
    )
    .unwrap();

    let (stdout, stderr, success) = run_ask(&config_path, &["index", docs.to_str().unwrap()]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files indexed: 1"));

    let (stdout, _, success) = run_ask(
        &config_path,
        &[
            "search",
            "office ipsum marker",
            "--path",
            docs.to_str().unwrap(),
        ],
    );
    assert!(success);
    assert!(
        stdout.contains("office ipsum marker"),
        "expected the docx text in results: {}",
        stdout
    );
}

#[test]
fn test_odt_indexes_and_is_searchable() {
    let (_tmp, config_path, docs) = setup_env();
    fs::write(
        docs.join("letter.odt"),
        minimal_odt_with_phrase("opendocument ipsum marker"),
    )
    .unwrap();

    let (stdout, stderr, success) = run_ask(&config_path, &["index", docs.to_str().unwrap()]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files indexed: 1"));

    let (stdout, _, success) = run_ask(
        &config_path,
        &[
            "search",
            "opendocument ipsum marker",
            "--path",
            docs.to_str().unwrap(),
        ],
    );
    assert!(success);
    assert!(
        stdout.contains("opendocument ipsum marker"),
        "expected the odt text in results: {}",
        stdout
    );
}

#[test]
fn test_corrupt_office_documents_are_skipped_not_fatal() {
    let (_tmp, config_path, docs) = setup_env();
    fs::write(docs.join("broken.docx"), b"not a zip archive").unwrap();
    fs::write(docs.join("broken.odt"), b"also not a zip archive").unwrap();
    fs::write(docs.join("fine.txt"), "A perfectly readable file.").unwrap();

    let (stdout, stderr, success) = run_ask(&config_path, &["index", docs.to_str().unwrap()]);
    assert!(success, "run should not abort: stderr={}", stderr);
    assert!(stdout.contains("files indexed: 1"));
    assert!(stdout.contains("files skipped: 2"));
    assert!(stderr.contains("broken.docx"));
    assert!(stderr.contains("broken.odt"));
}
