//! Multipart form decoding

use crate::csv_io::decode_upload;
use crate::error::ParseError;
use axum::extract::Multipart;

/// Fields posted by the upload, run and download forms
#[derive(Debug, Default, Clone)]
pub struct RunForm {
    /// CSV text, from the file input or the hidden `csv` field
    pub csv: Option<String>,
    /// Raw threshold control value
    pub threshold: Option<String>,
}

impl RunForm {
    /// Read every part of the request. Unknown fields are ignored; an
    /// empty file part (no file chosen) counts as absent.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ParseError> {
        let mut form = RunForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ParseError::Multipart(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ParseError::Multipart(e.to_string()))?;
                    if !bytes.is_empty() {
                        form.csv = Some(decode_upload(&bytes)?);
                    }
                }
                "csv" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ParseError::Multipart(e.to_string()))?;
                    // The file input wins when both are posted
                    if form.csv.is_none() && !text.is_empty() {
                        form.csv = Some(text);
                    }
                }
                "threshold" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ParseError::Multipart(e.to_string()))?;
                    form.threshold = Some(text);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// The CSV text, or an error naming the file field
    pub fn csv_text(&self) -> Result<&str, ParseError> {
        self.csv
            .as_deref()
            .ok_or_else(|| ParseError::MissingField("file".to_string()))
    }
}
