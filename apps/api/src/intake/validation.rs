use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncReadExt;

/// Upper bound on resume size: 5 MB. A file of exactly this size is accepted.
pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;

pub const PDF_MIME: &str = "application/pdf";
pub const DOC_MIME: &str = "application/msword";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const ALLOWED_RESUME_MIME_TYPES: [&str; 3] = [PDF_MIME, DOC_MIME, DOCX_MIME];

/// Bytes read from the head of a file when its extension gives no MIME type.
const SNIFF_LEN: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please upload a PDF, DOC, or DOCX file")]
    UnsupportedType { mime: Option<String> },

    #[error("File size must be less than 5MB")]
    TooLarge { size_bytes: u64 },

    #[error("Wait for the current analysis to finish")]
    SubmissionPending,
}

impl SelectionError {
    pub fn title(&self) -> &'static str {
        match self {
            SelectionError::UnsupportedType { .. } => "Invalid file type",
            SelectionError::TooLarge { .. } => "File too large",
            SelectionError::SubmissionPending => "Submission in progress",
        }
    }
}

/// A file the user picked as their resume, described the way a browser `File` is:
/// name, size, and MIME type. The bytes stay on disk until upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeCandidate {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub mime: Option<String>,
}

impl ResumeCandidate {
    /// Describes the file at `path`. The MIME type comes from the extension, falling
    /// back to content sniffing when the extension is unknown or missing.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension)
        {
            Some(mime) => Some(mime.to_string()),
            None => sniff_mime(path).await?,
        };

        Ok(Self {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size_bytes: metadata.len(),
            mime,
        })
    }
}

/// MIME type a browser would report for a file extension. Only common document
/// formats are listed; anything else is left to sniffing.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some(PDF_MIME),
        "doc" => Some(DOC_MIME),
        "docx" => Some(DOCX_MIME),
        "txt" | "text" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "rtf" => Some("application/rtf"),
        "odt" => Some("application/vnd.oasis.opendocument.text"),
        "html" | "htm" => Some("text/html"),
        _ => None,
    }
}

async fn sniff_mime(path: &Path) -> io::Result<Option<String>> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut head = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < head.len() {
        let n = file.read(&mut head[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    head.truncate(filled);
    Ok(infer::get(&head).map(|kind| kind.mime_type().to_string()))
}

/// Checks a candidate against the MIME allow-list, then the size ceiling.
pub fn validate_resume(candidate: &ResumeCandidate) -> Result<(), SelectionError> {
    let allowed = candidate
        .mime
        .as_deref()
        .is_some_and(|mime| ALLOWED_RESUME_MIME_TYPES.contains(&mime));
    if !allowed {
        return Err(SelectionError::UnsupportedType {
            mime: candidate.mime.clone(),
        });
    }

    if candidate.size_bytes > MAX_RESUME_BYTES {
        return Err(SelectionError::TooLarge {
            size_bytes: candidate.size_bytes,
        });
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn candidate(file_name: &str, size_bytes: u64, mime: Option<&str>) -> ResumeCandidate {
    ResumeCandidate {
        path: PathBuf::from("/tmp").join(file_name),
        file_name: file_name.to_string(),
        size_bytes,
        mime: mime.map(String::from),
    }
}
