//! Error types for the configuration model.
//!
//! Grammar violations and typed-accessor failures are reported through a
//! single error enum, avoiding panics in favor of explicit error handling.

use std::fmt;
use std::io;

/// The main error type for configuration operations.
#[derive(Debug)]
pub enum Error {
    /// Malformed grammar: a bad section header, an unterminated array or
    /// quoted string, or a reserved character in a name.
    ///
    /// Fatal when the document is in strict mode; otherwise the offending
    /// line is skipped during parsing.
    Format {
        /// Source line number, when the error came from the parser.
        line: Option<usize>,
        /// What was wrong with the input.
        reason: String,
    },

    /// A typed accessor was called on a value that does not parse as the
    /// requested type. Always propagated to the caller, never swallowed.
    Parse {
        /// The raw stored value that failed to convert.
        value: String,
        /// The type that was requested.
        expected: &'static str,
    },

    /// An I/O error from file load/save, passed through unchanged.
    Io(io::Error),
}

impl Error {
    /// Build a `Format` error with no line attribution.
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        Error::Format {
            line: None,
            reason: reason.into(),
        }
    }

    /// Attach a source line number to a `Format` error.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Error::Format { reason, .. } => Error::Format {
                line: Some(line),
                reason,
            },
            other => other,
        }
    }

    /// The source line this error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Format { line, .. } => *line,
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format {
                line: Some(line),
                reason,
            } => write!(f, "line {}: {}", line, reason),
            Error::Format { line: None, reason } => write!(f, "{}", reason),
            Error::Parse { value, expected } => {
                write!(f, "cannot parse {:?} as {}", value, expected)
            }
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_display_with_line() {
        let err = Error::format("malformed section start: [oops").at_line(3);
        assert_eq!(format!("{}", err), "line 3: malformed section start: [oops");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_format_display_without_line() {
        let err = Error::format("array end not found");
        assert_eq!(format!("{}", err), "array end not found");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_parse_display() {
        let err = Error::Parse {
            value: "abc".to_string(),
            expected: "i32",
        };
        assert_eq!(format!("{}", err), "cannot parse \"abc\" as i32");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
