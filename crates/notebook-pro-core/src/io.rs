//! Plain-text import and export.
//!
//! Files are decoded with BOM sniffing, then UTF-8, then a `chardetng` guess
//! handed to `encoding_rs`. Line endings are normalized to `\n` in memory and
//! the detected style is written back on save.

use std::path::Path;

use anyhow::{bail, Context, Result};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Encoding a text file was read with, and will be written back with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    /// Any other encoding `encoding_rs` knows by name (e.g. "windows-1252").
    Legacy(&'static str),
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Utf8Bom => write!(f, "UTF-8 BOM"),
            Self::Utf16Le => write!(f, "UTF-16 LE"),
            Self::Utf16Be => write!(f, "UTF-16 BE"),
            Self::Legacy(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// The first line break style found in `text`, `Lf` if there is none.
    pub fn detect(text: &str) -> Self {
        match text.find(['\r', '\n']) {
            Some(i) if text[i..].starts_with("\r\n") => Self::CrLf,
            Some(i) if text[i..].starts_with('\r') => Self::Cr,
            _ => Self::Lf,
        }
    }

    /// Rewrites `\n`-separated text with this line ending.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            other => text.replace('\n', other.as_str()),
        }
    }
}

/// Converts every line break to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// On-disk format of a text file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
}

/// A decoded text file: `\n`-normalized text plus the format it came in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub text: String,
    pub format: TextFormat,
}

pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(&UTF8_BOM) {
        TextEncoding::Utf8Bom
    } else if bytes.starts_with(&UTF16_LE_BOM) {
        TextEncoding::Utf16Le
    } else if bytes.starts_with(&UTF16_BE_BOM) {
        TextEncoding::Utf16Be
    } else if std::str::from_utf8(bytes).is_ok() {
        TextEncoding::Utf8
    } else {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, true);
        TextEncoding::Legacy(detector.guess(None, true).name())
    }
}

fn decode_utf16(bytes: &[u8], from_pair: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        bail!("odd byte count in UTF-16 content");
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| from_pair([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).context("invalid UTF-16 content")
}

/// Decodes `bytes`, stripping any byte order mark.
///
/// # Errors
///
/// Returns an error if the bytes are not valid in `encoding`.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).context("invalid UTF-8 content"),
        TextEncoding::Utf8Bom => {
            let body = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
            String::from_utf8(body.to_vec()).context("invalid UTF-8 content")
        }
        TextEncoding::Utf16Le => {
            decode_utf16(bytes.strip_prefix(&UTF16_LE_BOM).unwrap_or(bytes), u16::from_le_bytes)
        }
        TextEncoding::Utf16Be => {
            decode_utf16(bytes.strip_prefix(&UTF16_BE_BOM).unwrap_or(bytes), u16::from_be_bytes)
        }
        TextEncoding::Legacy(name) => {
            let codec = encoding_rs::Encoding::for_label(name.as_bytes())
                .with_context(|| format!("unknown encoding: {name}"))?;
            let (text, had_errors) = codec.decode_without_bom_handling(bytes);
            if had_errors {
                bail!("malformed {name} content");
            }
            Ok(text.into_owned())
        }
    }
}

/// Encodes `text`, writing a byte order mark for the BOM-carrying encodings.
///
/// # Errors
///
/// Returns an error if `text` has characters `encoding` cannot represent.
pub fn encode(text: &str, encoding: TextEncoding) -> Result<Vec<u8>> {
    let bytes = match encoding {
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
        TextEncoding::Utf8Bom => [&UTF8_BOM[..], text.as_bytes()].concat(),
        TextEncoding::Utf16Le => UTF16_LE_BOM
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_le_bytes))
            .collect(),
        TextEncoding::Utf16Be => UTF16_BE_BOM
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
            .collect(),
        TextEncoding::Legacy(name) => {
            let codec = encoding_rs::Encoding::for_label(name.as_bytes())
                .with_context(|| format!("unknown encoding: {name}"))?;
            let (bytes, _, unmappable) = codec.encode(text);
            if unmappable {
                bail!("text cannot be represented as {name}");
            }
            bytes.into_owned()
        }
    };
    Ok(bytes)
}

/// Reads and decodes a text file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn read_text_file(path: &Path) -> Result<TextFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
    let encoding = detect_encoding(&bytes);
    let raw = decode(&bytes, encoding)
        .with_context(|| format!("failed to decode file: {}", path.display()))?;
    let line_ending = LineEnding::detect(&raw);
    tracing::debug!(path = %path.display(), %encoding, ?line_ending, "read text file");
    Ok(TextFile {
        text: normalize_line_endings(&raw),
        format: TextFormat {
            encoding,
            line_ending,
        },
    })
}

/// Encodes `\n`-separated `text` in `format` and writes it to `path`.
///
/// # Errors
///
/// Returns an error if the text cannot be encoded or the file written.
pub fn write_text_file(path: &Path, text: &str, format: TextFormat) -> Result<()> {
    let bytes = encode(&format.line_ending.apply(text), format.encoding)
        .with_context(|| format!("failed to encode text for {}", path.display()))?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_encoding() {
        assert_eq!(detect_encoding(b"plain ascii"), TextEncoding::Utf8);
        assert_eq!(detect_encoding("naïve".as_bytes()), TextEncoding::Utf8);
        assert_eq!(detect_encoding(b"\xEF\xBB\xBFhi"), TextEncoding::Utf8Bom);
        assert_eq!(detect_encoding(b"\xFF\xFEh\x00"), TextEncoding::Utf16Le);
        assert_eq!(detect_encoding(b"\xFE\xFF\x00h"), TextEncoding::Utf16Be);
    }

    #[test]
    fn test_detect_legacy_encoding() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode("café crème brûlée");
        assert!(matches!(detect_encoding(&bytes), TextEncoding::Legacy(_)));
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode(b"\xEF\xBB\xBFhi", TextEncoding::Utf8Bom).unwrap(), "hi");
        assert_eq!(
            decode(b"\xFF\xFEh\x00i\x00", TextEncoding::Utf16Le).unwrap(),
            "hi"
        );
        assert_eq!(
            decode(b"\xFE\xFF\x00h\x00i", TextEncoding::Utf16Be).unwrap(),
            "hi"
        );
    }

    #[test]
    fn test_decode_rejects_odd_utf16() {
        assert!(decode(b"\xFF\xFEh", TextEncoding::Utf16Le).is_err());
    }

    #[test]
    fn test_encode_writes_bom() {
        assert_eq!(encode("hi", TextEncoding::Utf8Bom).unwrap(), b"\xEF\xBB\xBFhi");
        assert_eq!(
            encode("hi", TextEncoding::Utf16Be).unwrap(),
            b"\xFE\xFF\x00h\x00i"
        );
    }

    #[test]
    fn test_encode_unmappable_fails() {
        assert!(encode("日本", TextEncoding::Legacy("windows-1252")).is_err());
    }

    #[test]
    fn test_line_endings() {
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("no breaks"), LineEnding::Lf);
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(LineEnding::CrLf.apply("a\nb"), "a\r\nb");
    }

    #[test]
    fn test_read_write_preserves_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("windows.txt");
        std::fs::write(&path, b"\xEF\xBB\xBFone\r\ntwo").unwrap();

        let file = read_text_file(&path).unwrap();
        assert_eq!(file.text, "one\ntwo");
        assert_eq!(file.format.encoding, TextEncoding::Utf8Bom);
        assert_eq!(file.format.line_ending, LineEnding::CrLf);

        write_text_file(&path, "one\ntwo\nthree", file.format).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"\xEF\xBB\xBFone\r\ntwo\r\nthree");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read file"));
    }
}
