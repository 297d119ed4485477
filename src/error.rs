use thiserror::Error;

#[derive(Debug, Error)]
pub enum InkError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Image decode error: {0}")]
    DecodeError(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`InkError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl InkError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an image decode error.
    decode => DecodeError,
    /// Create an extraction error.
    extraction => ExtractionError,
    /// Create a render error.
    render => RenderError,
    /// Create a font error.
    font => FontError,
    /// Create an export error.
    export => ExportError,
}

impl From<image::ImageError> for InkError {
    fn from(e: image::ImageError) -> Self {
        Self::DecodeError(e.to_string())
    }
}

impl From<serde_yml::Error> for InkError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for InkError {
    fn from(e: serde_json::Error) -> Self {
        Self::ExportError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InkError>;
