//! Document decoding.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{ISO_8859_5, KOI8_R, WINDOWS_1251};

use super::SourceError;

/// Read the article text of the document at `path`.
///
/// Only `.txt` files are supported.  The bytes are read as UTF-8 (a leading
/// byte-order mark is dropped) and otherwise as the first of windows-1251,
/// KOI8-R or ISO-8859-5 that decodes them without errors.
pub fn decode_file(path: &Path) -> Result<String, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => {
            let bytes = std::fs::read(path)?;
            let text = decode_text(&bytes)?;
            if text.trim().is_empty() {
                return Err(SourceError::Empty);
            }
            log::info!("source: decoded {} ({} chars)", path.display(), text.chars().count());
            Ok(text.into_owned())
        }
        other => Err(SourceError::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{other}")
        })),
    }
}

fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>, SourceError> {
    let utf8 = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let utf8_err = match std::str::from_utf8(utf8) {
        Ok(text) => return Ok(Cow::Borrowed(text)),
        Err(e) => e,
    };
    log::warn!("source: file is not UTF-8 ({utf8_err}), trying legacy encodings");

    for encoding in [WINDOWS_1251, KOI8_R, ISO_8859_5] {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            log::info!("source: decoded as {}", encoding.name());
            return Ok(text);
        }
    }
    Err(SourceError::Decode(utf8_err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_utf8_text_and_strips_bom() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("article.TXT");
        std::fs::write(&path, "\u{FEFF}Заголовок\n\nТекст статьи.").unwrap();

        assert_eq!(decode_file(&path).unwrap(), "Заголовок\n\nТекст статьи.");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nope.txt");

        assert!(matches!(decode_file(&path), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn other_formats_are_unsupported() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("paper.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        match decode_file(&path) {
            Err(SourceError::UnsupportedFormat(ext)) => assert_eq!(ext, ".pdf"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn windows_1251_file_is_decoded() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("cp1251.txt");
        // "Привет" in Windows-1251.
        std::fs::write(&path, [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]).unwrap();

        assert_eq!(decode_file(&path).unwrap(), "Привет");
    }

    #[test]
    fn utf8_wins_over_legacy_encodings() {
        // Valid UTF-8 would also decode (as mojibake) under windows-1251.
        let text = decode_text("Привет".as_bytes()).unwrap();
        assert_eq!(text, "Привет");
        assert!(matches!(text, Cow::Borrowed(_)));
    }

    #[test]
    fn blank_file_is_empty() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n ").unwrap();

        assert!(matches!(decode_file(&path), Err(SourceError::Empty)));
    }
}
