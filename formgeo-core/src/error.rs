use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormGeoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AI response is missing the `fields` array")]
    MissingFields,

    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),

    #[error("Invalid PDF structure: {0}")]
    PdfStructure(String),
}

pub type Result<T> = std::result::Result<T, FormGeoError>;

impl From<lopdf::Error> for FormGeoError {
    fn from(err: lopdf::Error) -> Self {
        FormGeoError::PdfStructure(err.to_string())
    }
}
