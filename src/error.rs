use std::error;
use std::fmt;
use std::io;
use std::result;

use bstr::ByteSlice;

use crate::reader::Position;

/// A type alias for `Result<T, dsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing delimited data.
///
/// Every error is terminal for the parse or write in progress. Rows already
/// handed to the caller and bytes already written to a sink stay valid; they
/// just may be a truncated prefix of the whole.
#[derive(Debug)]
pub enum Error {
    /// An I/O error from the underlying source or sink.
    ///
    /// When returned from a writer, the sink may hold part of the line that
    /// was being written.
    Io(io::Error),
    /// The source data is not valid UTF-8.
    Utf8 {
        /// The position of the line in which this error occurred, if
        /// available.
        pos: Option<Position>,
        /// The corresponding UTF-8 error.
        err: Utf8Error,
    },
    /// The data ended inside a quoted field.
    ///
    /// No part of the line containing the open quote was reported.
    Malformed {
        /// The position of the line holding the unterminated field. Its
        /// `field` is the index of that field.
        pos: Position,
    },
    /// A delimiter that would make the data ambiguous was requested.
    InvalidDelimiter(char),
}

impl Error {
    /// Return the position at which this error occurred, if available.
    pub fn position(&self) -> Option<&Position> {
        match *self {
            Error::Utf8 { pos: Some(ref pos), .. } => Some(pos),
            Error::Malformed { ref pos } => Some(pos),
            _ => None,
        }
    }

    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Attach a position to a UTF-8 error that does not have one yet.
    pub(crate) fn at(self, at: &Position) -> Error {
        match self {
            Error::Utf8 { pos: None, err } => {
                Error::Utf8 { pos: Some(at.clone()), err }
            }
            err => err,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<dsv_core::InvalidDelimiter> for Error {
    fn from(err: dsv_core::InvalidDelimiter) -> Error {
        Error::InvalidDelimiter(err.0)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Utf8 { ref err, .. } => Some(err),
            Error::Malformed { .. } => None,
            Error::InvalidDelimiter(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::Utf8 { pos: None, ref err } => {
                write!(f, "CSV parse error: {}", err)
            }
            Error::Utf8 { pos: Some(ref pos), ref err } => write!(
                f,
                "CSV parse error: line {} (byte {}): {}",
                pos.line(),
                pos.byte(),
                err
            ),
            Error::Malformed { ref pos } => write!(
                f,
                "CSV parse error: line {} (byte {}, field {}): \
                 quoted field is not terminated before the end of the data",
                pos.line(),
                pos.byte(),
                pos.field()
            ),
            Error::InvalidDelimiter(delim) => {
                dsv_core::InvalidDelimiter(delim).fmt(f)
            }
        }
    }
}

/// An error that occurs when source bytes are not valid UTF-8.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Utf8Error {
    /// The offset, from the start of the source, of the first invalid byte.
    offset: u64,
    /// The invalid (or truncated) byte sequence.
    bytes: Vec<u8>,
}

impl Utf8Error {
    pub(crate) fn new(offset: u64, bytes: Vec<u8>) -> Utf8Error {
        Utf8Error { offset, bytes }
    }

    /// The offset, from the start of the source, of the first invalid byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The invalid byte sequence.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid UTF-8 {:?} at byte offset {}",
            self.bytes.as_bstr(),
            self.offset
        )
    }
}

impl error::Error for Utf8Error {}

/// `IntoInnerError` occurs when consuming a `Writer` fails.
///
/// Consuming the `Writer` flushes the sink, which can fail. The writer is
/// handed back so that no data is lost.
pub struct IntoInnerError<W> {
    wtr: W,
    err: io::Error,
}

impl<W> IntoInnerError<W> {
    /// Creates a new `IntoInnerError`.
    pub(crate) fn new(wtr: W, err: io::Error) -> IntoInnerError<W> {
        IntoInnerError { wtr, err }
    }

    /// Returns the error which caused the call to `into_inner` to fail.
    pub fn error(&self) -> &io::Error {
        &self.err
    }

    /// Returns the writer instance which generated the error.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

impl<W: std::any::Any> error::Error for IntoInnerError<W> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.err)
    }
}

impl<W> fmt::Display for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl<W> fmt::Debug for IntoInnerError<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.err.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;
    use std::io;

    use crate::reader::Position;

    use super::{Error, Utf8Error};

    #[test]
    fn malformed_display() {
        let err = Error::Malformed { pos: Position::new(40, 3, 1) };
        assert_eq!(
            err.to_string(),
            "CSV parse error: line 3 (byte 40, field 1): quoted field is \
             not terminated before the end of the data"
        );
        assert_eq!(err.position().map(|p| p.line()), Some(3));
        assert!(err.source().is_none());
    }

    #[test]
    fn utf8_display_escapes_bytes() {
        let err = Utf8Error::new(7, vec![0xFF]);
        assert_eq!(
            err.to_string().to_lowercase(),
            "invalid utf-8 \"\\xff\" at byte offset 7"
        );

        let err = Error::Utf8 { pos: None, err }.at(&Position::new(5, 1, 0));
        assert_eq!(err.position().map(|p| p.byte()), Some(5));
    }

    #[test]
    fn io_error_has_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(err.is_io_error());
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn invalid_delimiter_from_core() {
        let err = Error::from(dsv_core::InvalidDelimiter('"'));
        match err {
            Error::InvalidDelimiter('"') => {}
            err => panic!("unexpected error: {:?}", err),
        }
    }
}
