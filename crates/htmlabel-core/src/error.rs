use crate::token::LexError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Resource exhausted: {resource} nesting exceeds the limit of {limit}")]
    ResourceExhausted { resource: &'static str, limit: usize },

    #[error("Invalid parse options: {message}")]
    InvalidOptions { message: String },
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            offset,
        }
    }

    /// Byte offset of the offending input, when the error is tied to one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. } => Some(*offset),
            Self::Lex(err) => Some(err.offset),
            Self::ResourceExhausted { .. } | Self::InvalidOptions { .. } => None,
        }
    }
}
