//! Inline PDF attachments.
//!
//! Documents are kept inside the owning record as `data:` URLs. Each upload
//! is validated on its own; a rejected file never affects the other files of
//! the same batch.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::error::AttachmentError;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Largest accepted attachment: 10 MiB.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// Attachments kept per record unless the caller says otherwise.
pub const DEFAULT_MAX_FILES: usize = 5;

const DATA_URL_PREFIX: &str = "data:application/pdf;base64,";

/// A file handed over by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Check type and size of an upload.
pub fn validate_pdf(file: &UploadedFile) -> Result<(), AttachmentError> {
    if file.mime_type != PDF_MIME_TYPE {
        return Err(AttachmentError::NotPdf {
            name: file.name.clone(),
        });
    }
    if file.size() > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge {
            name: file.name.clone(),
            size: file.size(),
            limit: MAX_ATTACHMENT_BYTES,
        });
    }
    Ok(())
}

/// Encode an upload as an inline `data:` URL.
pub fn encode_data_url(file: &UploadedFile) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(&file.data))
}

/// Decode a stored attachment back to its bytes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, AttachmentError> {
    let encoded = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| AttachmentError::MalformedData("not a PDF data URL".to_string()))?;
    STANDARD
        .decode(encoded)
        .map_err(|e| AttachmentError::MalformedData(e.to_string()))
}

/// Display name for the attachment at `index`.
pub fn display_name(index: usize) -> String {
    format!("Document {}.pdf", index + 1)
}

/// Outcome of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// The record's attachment list after the batch.
    pub files: Vec<String>,
    /// Files that were refused, with the reason.
    pub rejected: Vec<AttachmentError>,
}

/// Validate and append a batch of uploads to a record's attachments.
///
/// The result keeps the existing attachments first and is truncated to
/// `max_files`.
pub fn accept_batch(current: &[String], uploads: &[UploadedFile], max_files: usize) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        files: current.to_vec(),
        rejected: Vec::new(),
    };

    for upload in uploads {
        match validate_pdf(upload) {
            Ok(()) => outcome.files.push(encode_data_url(upload)),
            Err(e) => outcome.rejected.push(e),
        }
    }

    outcome.files.truncate(max_files);
    outcome
}

/// Remove the attachment at `index`, if present.
pub fn remove_at(current: &[String], index: usize) -> Vec<String> {
    current
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, f)| f.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: usize) -> UploadedFile {
        UploadedFile::new(name, PDF_MIME_TYPE, vec![b'%'; size])
    }

    #[test]
    fn test_oversized_pdf_rejected() {
        let big = pdf("x.pdf", 12 * 1024 * 1024);
        let err = validate_pdf(&big).unwrap_err();
        assert!(matches!(err, AttachmentError::TooLarge { ref name, .. } if name == "x.pdf"));

        let outcome = accept_batch(&[], &[big], DEFAULT_MAX_FILES);
        assert!(outcome.files.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn test_png_rejected() {
        let png = UploadedFile::new("photo.png", "image/png", vec![0u8; 64]);
        assert_eq!(
            validate_pdf(&png),
            Err(AttachmentError::NotPdf {
                name: "photo.png".to_string()
            })
        );
    }

    #[test]
    fn test_limit_is_inclusive() {
        assert!(validate_pdf(&pdf("edge.pdf", MAX_ATTACHMENT_BYTES)).is_ok());
        assert!(validate_pdf(&pdf("over.pdf", MAX_ATTACHMENT_BYTES + 1)).is_err());
    }

    #[test]
    fn test_siblings_survive_rejection() {
        let uploads = vec![
            pdf("a.pdf", 10),
            UploadedFile::new("b.png", "image/png", vec![1u8; 10]),
            pdf("c.pdf", 20),
        ];
        let existing = vec![encode_data_url(&pdf("old.pdf", 5))];

        let outcome = accept_batch(&existing, &uploads, DEFAULT_MAX_FILES);
        assert_eq!(outcome.files.len(), 3);
        assert_eq!(outcome.files[0], existing[0]);
        assert_eq!(decode_data_url(&outcome.files[2]).unwrap().len(), 20);
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn test_outcome_keeps_rejections_when_cloned() {
        let png = UploadedFile::new("scan.png", "image/png", vec![0u8; 4]);
        let outcome = accept_batch(&[], &[png, pdf("ok.pdf", 4)], DEFAULT_MAX_FILES);

        let copy = outcome.clone();
        assert_eq!(copy, outcome);
        assert_eq!(
            copy.rejected,
            vec![AttachmentError::NotPdf {
                name: "scan.png".to_string()
            }]
        );
    }

    #[test]
    fn test_batch_truncated_to_max_files() {
        let uploads: Vec<_> = (0..4).map(|i| pdf(&format!("{i}.pdf"), 8)).collect();
        let outcome = accept_batch(&[], &uploads, 2);
        assert_eq!(outcome.files.len(), 2);
    }

    #[test]
    fn test_remove_and_names() {
        let files = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(remove_at(&files, 1), vec!["a".to_string(), "c".to_string()]);
        assert_eq!(display_name(0), "Document 1.pdf");
        assert!(decode_data_url("data:image/png;base64,AAAA").is_err());
    }
}
