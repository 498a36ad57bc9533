/*!
`dsv-core` provides a bare bones, incremental parser and writer for CSV and
other delimiter-separated data.

The parser is a small state machine that is fed chunks of already decoded
text. It never allocates on its own: unescaped field contents are appended
to a caller provided `String`, and the caller is told where fields and
records end. The writer does the inverse: it appends the serialized form of
fields to a caller provided `String`, quoting only when a field would
otherwise be ambiguous.

Neither the parser nor the writer does any I/O. See the `dsv` crate for a
convenient interface built on top of this one.

# Example: reading records

```
use dsv_core::{Configuration, ReadRecordResult, Reader};

let mut rdr = Reader::new(Configuration::default());
let mut data = "a,\"b,c\"\nd,e";
let (mut field_data, mut ends) = (String::new(), vec![]);
let mut records = vec![];
loop {
    let (res, nin) = rdr.read_record(data, &mut field_data, &mut ends);
    data = &data[nin..];
    match res {
        ReadRecordResult::InputEmpty => continue,
        ReadRecordResult::Record => {
            records.push((field_data.clone(), ends.clone()));
            field_data.clear();
            ends.clear();
        }
        ReadRecordResult::End => break,
        ReadRecordResult::UnterminatedQuote => panic!("bad CSV"),
    }
}
assert_eq!(records[0], ("ab,c".to_string(), vec![1, 4]));
assert_eq!(records[1], ("de".to_string(), vec![1, 2]));
```
*/

#![deny(missing_docs)]

use std::error;
use std::fmt;

pub use crate::reader::{ReadFieldResult, ReadRecordResult, Reader};
pub use crate::writer::{needs_quotes, quote, Writer};

mod reader;
mod writer;

/// The quote character. It is not configurable.
pub const QUOTE: char = '"';

/// The record terminator emitted by writers.
///
/// Parsers accept `\r`, `\n` and `\r\n` alike.
pub const TERMINATOR: char = '\n';

/// Returns true if and only if `c` ends a record when it appears outside of
/// a quoted field.
#[inline]
pub fn is_terminator(c: char) -> bool {
    c == '\r' || c == '\n'
}

/// The dialect shared by parsers and writers.
///
/// The only knob is the field delimiter. Quoting always uses `"` and quotes
/// inside quoted fields are always escaped by doubling them.
///
/// A `Configuration` is cheap to copy and cannot be changed once built.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Configuration {
    delimiter: char,
    /// Set when the delimiter fits in a single byte, which permits
    /// searching UTF-8 text for it bytewise.
    ascii_delimiter: Option<u8>,
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration { delimiter: ',', ascii_delimiter: Some(b',') }
    }
}

impl Configuration {
    /// Create a configuration that separates fields with `delimiter`.
    ///
    /// This fails if the delimiter is the quote character or a record
    /// terminator, since such data could never be parsed unambiguously.
    pub fn new(delimiter: char) -> Result<Configuration, InvalidDelimiter> {
        if delimiter == QUOTE || is_terminator(delimiter) {
            return Err(InvalidDelimiter(delimiter));
        }
        let ascii_delimiter =
            if delimiter.is_ascii() { Some(delimiter as u8) } else { None };
        Ok(Configuration { delimiter, ascii_delimiter })
    }

    /// The field delimiter.
    ///
    /// The default is `,`.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The delimiter as a single byte, if it is ASCII.
    pub fn ascii_delimiter(&self) -> Option<u8> {
        self.ascii_delimiter
    }
}

/// An error returned when a delimiter cannot be used.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidDelimiter(pub char);

impl fmt::Display for InvalidDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid delimiter {:?}: the delimiter may not be a quote \
             or a line terminator",
            self.0
        )
    }
}

impl error::Error for InvalidDelimiter {}
