use thiserror::Error;

/// A document could not be turned into JSON.
#[derive(Debug, Error)]
pub enum JsonpError {
    #[error("not a parsable jsonp document: missing `{0}`")]
    Structure(&'static str),

    #[error("not a parsable jsonp document: invalid arguments list: {0}")]
    Arguments(#[source] serde_json::Error),

    #[error("not a parsable jsonp document: invalid returned object: {0}")]
    Body(#[source] serde_json::Error),

    #[error("not a parsable jsonp document: object literal is missing `{0}`")]
    Unterminated(char),
}

/// Which stage of the decoder rejected a document.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document doesn't have the expected function/arguments envelope.
    Structural,
    /// The trailing arguments list isn't valid JSON.
    Arguments,
    /// The object literal didn't end up as valid JSON.
    Final,
}

impl JsonpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JsonpError::Structure(_) => ErrorKind::Structural,
            JsonpError::Arguments(_) => ErrorKind::Arguments,
            JsonpError::Body(_) | JsonpError::Unterminated(_) => ErrorKind::Final,
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Structural => "structural",
            ErrorKind::Arguments => "arguments",
            ErrorKind::Final => "final",
        }
    }
}
