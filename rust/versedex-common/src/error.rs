use thiserror::Error;

/// The error type of the versedex crates.
///
/// The kind is boxed so that `Result<T>` stays small on the happy path; the
/// causal chain is available through [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        ErrorKind::InvalidOperation { name: name.into() }.into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }

    pub fn corrupt_index(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::CorruptIndex {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    /// Wraps a failure that happened while an index was being built.
    pub fn build(context: impl Into<String>, source: Error) -> Error {
        ErrorKind::Build {
            context: context.into(),
            source,
        }
        .into()
    }

    pub fn query(query: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::Query {
            query: query.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn is_corrupt_index(&self) -> bool {
        matches!(self.kind(), ErrorKind::CorruptIndex { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("corrupt index data in '{element}': {message}")]
    CorruptIndex { element: String, message: String },

    #[error("index build failed ({context}): {source}")]
    Build {
        context: String,
        #[source]
        source: Error,
    },

    #[error("query '{query}' failed: {message}")]
    Query { query: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
