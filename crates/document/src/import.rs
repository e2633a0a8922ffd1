//! Plain-text document import.
//!
//! The editor loads external files into the version store. Only formats that
//! already are plain text are handled here; binary formats (docx, pdf) are
//! the job of an external extraction step and are rejected with a clear
//! error.

use std::path::Path;
use thiserror::Error;

const SUPPORTED_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported format '{extension}' — supported: md, markdown, txt (convert binary formats to plain text first)")]
    UnsupportedFormat { extension: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("{path} is not valid UTF-8")]
    InvalidEncoding { path: String },
}

/// Read a plain-text document and normalize it for the store.
pub fn import_file(path: &Path) -> Result<String, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImportError::UnsupportedFormat { extension });
    }

    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| ImportError::Read {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ImportError::InvalidEncoding {
        path: display,
    })?;

    Ok(normalize_text(&text))
}

/// Strip a UTF-8 BOM and normalize line endings to LF.
pub fn normalize_text(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn imports_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\n\nBody.\n").unwrap();

        let text = import_file(&path).unwrap();
        assert_eq!(text, "# Notes\n\nBody.\n");
    }

    #[test]
    fn strips_bom_and_normalizes_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"\xef\xbb\xbfline one\r\nline two\r\n").unwrap();

        let text = import_file(&path).unwrap();
        assert_eq!(text, "line one\nline two\n");
    }

    #[test]
    fn rejects_binary_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        std::fs::write(&path, b"PK...").unwrap();

        let err = import_file(&path).unwrap_err();
        assert!(matches!(
            err,
            ImportError::UnsupportedFormat { extension } if extension == "docx"
        ));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = import_file(Path::new("/nonexistent/notes.md")).unwrap_err();
        assert!(matches!(err, ImportError::Read { .. }));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = import_file(&path).unwrap_err();
        assert!(matches!(err, ImportError::InvalidEncoding { .. }));
    }

    #[test]
    fn normalize_is_exposed_for_pasted_text() {
        assert_eq!(normalize_text("\u{feff}a\r\nb"), "a\nb");
    }
}
