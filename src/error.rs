use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Parsing MJML structure failed: {message}")]
    Parse { message: String },

    #[error("Parsing MJML structure failed: no root element specified")]
    EmptyDocument,

    #[error("Unknown starting tag <{tag}>: documents must start with <mjml>")]
    UnknownRootTag { tag: String },

    #[error("MJML badly formatted: {reason}")]
    BadlyFormatted { reason: String },

    #[error("Invalid child <{child}> in <{parent}>, allowed children are: {allowed}")]
    InvalidChild {
        parent: String,
        child: String,
        allowed: String,
    },

    #[error("Failed to validate field '{field}' in <{component}>: {reason}")]
    Validation {
        component: String,
        field: String,
        reason: String,
    },

    #[error("Invalid width '{value}': {reason}")]
    InvalidWidth { value: String, reason: String },

    #[error("Invalid style declaration '{declaration}'")]
    InvalidInlineStyle { declaration: String },

    #[error("CSS parse error: {message}")]
    Css { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl CompileError {
    pub(crate) fn invalid_width(value: &str, reason: impl Into<String>) -> Self {
        CompileError::InvalidWidth {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<quick_xml::Error> for CompileError {
    fn from(err: quick_xml::Error) -> Self {
        CompileError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<tera::Error> for CompileError {
    fn from(err: tera::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        CompileError::Template { message }
    }
}

impl From<std::fmt::Error> for CompileError {
    fn from(err: std::fmt::Error) -> Self {
        CompileError::Serialize(err.to_string())
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::Serialize(err.to_string())
    }
}
