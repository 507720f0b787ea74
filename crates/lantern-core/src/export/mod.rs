//! Export handoff: packaging clipboard contents for download.
//!
//! This module renders the ordered snippet texts into one of the supported
//! artifact formats. The caller hands the bytes to whatever download or
//! file-save collaborator it has; nothing here touches the filesystem.

mod pdf;
mod rtf;

use std::str::FromStr;

use crate::clipboard::SNIPPET_SEPARATOR;
use crate::error::{LanternError, Result};

/// The supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Rendered document, single flowed text block.
    Pdf,
    /// Word-compatible document, one paragraph per snippet.
    Doc,
    /// Plain text, blank-line separated.
    Txt,
    /// Ordered JSON array of snippet strings.
    Json,
}

impl ExportFormat {
    /// All formats, in the order the user is offered them.
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Doc,
        ExportFormat::Txt,
        ExportFormat::Json,
    ];

    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Doc => "doc",
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }

    /// MIME type of the rendered artifact.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Doc => "application/msword",
            ExportFormat::Txt => "text/plain",
            ExportFormat::Json => "application/json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = LanternError;

    /// Parses a format name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for anything other than pdf, doc, txt, json.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "doc" => Ok(ExportFormat::Doc),
            "txt" => Ok(ExportFormat::Txt),
            "json" => Ok(ExportFormat::Json),
            other => Err(LanternError::invalid_format(other)),
        }
    }
}

/// A rendered export ready for the download collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// The format the bytes were rendered in.
    pub format: ExportFormat,
    /// Suggested file name, with the format's extension.
    pub file_name: String,
    /// The rendered document.
    pub bytes: Vec<u8>,
}

/// Joins the snippets with a blank-line separator.
pub fn export_as_text(items: &[String]) -> String {
    items.join(SNIPPET_SEPARATOR)
}

/// Renders the snippets into the given format.
///
/// # Errors
///
/// Returns `Serialization` if JSON encoding fails.
pub fn export_as_structured(items: &[String], format: ExportFormat) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Txt => export_as_text(items).into_bytes(),
        ExportFormat::Json => serde_json::to_vec_pretty(items)?,
        ExportFormat::Doc => rtf::render(items),
        ExportFormat::Pdf => pdf::render(&export_as_text(items)),
    };

    Ok(ExportArtifact {
        format,
        file_name: format!("clipboard_export.{}", format.extension()),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(contents: &[&str]) -> Vec<String> {
        contents.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_export_as_text_blank_line_separated() {
        assert_eq!(export_as_text(&items(&["a", "b", "c"])), "a\n\nb\n\nc");
        assert_eq!(export_as_text(&items(&["solo"])), "solo");
        assert_eq!(export_as_text(&[]), "");
    }

    #[test]
    fn test_txt_artifact_matches_text_export() {
        let snippets = items(&["x", "y"]);
        let artifact = export_as_structured(&snippets, ExportFormat::Txt).unwrap();
        assert_eq!(artifact.bytes, export_as_text(&snippets).into_bytes());
        assert_eq!(artifact.file_name, "clipboard_export.txt");
    }

    #[test]
    fn test_json_round_trip() {
        let snippets = items(&["first", "second\nwith newline", "third"]);
        let artifact = export_as_structured(&snippets, ExportFormat::Json).unwrap();

        let parsed: Vec<String> = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, snippets);
    }

    #[test]
    fn test_doc_artifact_is_rtf() {
        let artifact = export_as_structured(&items(&["para"]), ExportFormat::Doc).unwrap();
        assert!(artifact.bytes.starts_with(b"{\\rtf1"));
        assert_eq!(artifact.format.content_type(), "application/msword");
    }

    #[test]
    fn test_pdf_artifact_is_pdf() {
        let artifact = export_as_structured(&items(&["block"]), ExportFormat::Pdf).unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(artifact.format.content_type(), "application/pdf");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(" txt ".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(err.is_invalid_format());
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_display_matches_extension() {
        for format in ExportFormat::ALL {
            assert_eq!(format.to_string(), format.extension());
        }
    }
}
