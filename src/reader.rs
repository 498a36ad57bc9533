use std::fs::File;
use std::io;
use std::path::Path;
use std::result;

use dsv_core::{Configuration, ReadRecordResult, Reader as CoreReader};
use log::{debug, trace, warn};

use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::row::Row;

/// A position in delimited data.
///
/// Line and field indices start at `0`. `byte` is an offset into the UTF-8
/// encoded source.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Position {
    byte: u64,
    line: u64,
    field: u64,
}

impl Position {
    /// Create a new position.
    pub fn new(byte: u64, line: u64, field: u64) -> Position {
        Position { byte, line, field }
    }

    /// The byte offset at which the line starts.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The index of the logical line. Newlines inside quoted fields do not
    /// start a new logical line.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The index of the field within its line.
    pub fn field(&self) -> u64 {
        self.field
    }
}

/// Receives the events of a parse, in document order.
///
/// Every method has a default implementation that does nothing, so a
/// consumer only implements what it cares about. Returning an error from any
/// method stops the parse immediately; no further events are delivered and
/// `Parser::parse` returns that error.
///
/// For each line, `line_begin` is only called once the whole line has been
/// parsed. A line that fails to parse (because it holds an unterminated
/// quoted field) produces no events at all.
pub trait Consumer {
    /// The error type this consumer may stop the parse with.
    ///
    /// Parse errors are converted into it.
    type Error: From<Error>;

    /// Called once before anything else.
    fn document_begin(&mut self) -> result::Result<(), Self::Error> {
        Ok(())
    }

    /// Called once after the last line, unless the parse failed.
    fn document_end(&mut self) -> result::Result<(), Self::Error> {
        Ok(())
    }

    /// Called when line number `line` starts.
    fn line_begin(&mut self, _line: u64) -> result::Result<(), Self::Error> {
        Ok(())
    }

    /// Called after the last field of line number `line`.
    fn line_end(&mut self, _line: u64) -> result::Result<(), Self::Error> {
        Ok(())
    }

    /// Called for every field, including empty ones.
    fn field_read(
        &mut self,
        _line: u64,
        _field: u64,
        _value: &str,
    ) -> result::Result<(), Self::Error> {
        Ok(())
    }
}

/// A streaming parser for delimited data.
///
/// The parser reads from any `io::Read`, decoding it as UTF-8 as it goes.
/// Rows can be pulled one at a time with `read_row` or the `rows` and
/// `into_rows` iterators, or pushed to a `Consumer` with `parse`. Only one
/// line of data is held in memory at a time.
///
/// Once an error has been returned, the parser yields no more rows.
///
/// # Example
///
/// ```
/// use dsv::{Configuration, Parser};
///
/// # fn main() { example().unwrap(); }
/// fn example() -> dsv::Result<()> {
///     let config = Configuration::new(';')?;
///     let mut parser = Parser::from_text(config, "a;\"b;c\"\r\nd;e");
///     let mut rows = vec![];
///     for result in parser.rows() {
///         rows.push(result?);
///     }
///     assert_eq!(rows[0], vec!["a", "b;c"]);
///     assert_eq!(rows[1], vec!["d", "e"]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Parser<R> {
    core: CoreReader,
    src: Decoder<R>,
    /// The position of the next line.
    pos: Position,
    /// Set at the end of the data and after any error.
    done: bool,
}

impl Parser<io::Empty> {
    /// Create a parser for text that is already in memory.
    ///
    /// The text is parsed in place. It is not copied or checked for UTF-8
    /// again.
    pub fn from_text<S: Into<String>>(
        config: Configuration,
        text: S,
    ) -> Parser<io::Empty> {
        Parser {
            core: CoreReader::new(config),
            src: Decoder::from_text(text.into()),
            pos: Position::default(),
            done: false,
        }
    }
}

impl Parser<File> {
    /// Create a parser for the file at the given path.
    pub fn from_path<P: AsRef<Path>>(
        config: Configuration,
        path: P,
    ) -> Result<Parser<File>> {
        Ok(Parser::from_reader(config, File::open(path)?))
    }
}

impl<R: io::Read> Parser<R> {
    /// Create a parser for UTF-8 encoded data read from `rdr`.
    ///
    /// The source is buffered internally, so wrapping it in a
    /// `io::BufReader` is not necessary.
    pub fn from_reader(config: Configuration, rdr: R) -> Parser<R> {
        Parser {
            core: CoreReader::new(config),
            src: Decoder::new(rdr),
            pos: Position::default(),
            done: false,
        }
    }

    /// The dialect this parser was built with.
    pub fn config(&self) -> &Configuration {
        self.core.config()
    }

    /// The position of the next line to be read.
    ///
    /// Its `field` is always `0`. If the previous line ended on `\r`, `byte`
    /// does not yet account for a `\n` that may follow it.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns true once all data has been read or an error has occurred.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// A reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        self.src.get_ref()
    }

    /// Read the next line into `row`, replacing its contents.
    ///
    /// Returns `false` when there are no more lines. Reusing one `Row`
    /// across calls avoids an allocation per line.
    ///
    /// # Errors
    ///
    /// `Error::Malformed` if the data ends inside a quoted field,
    /// `Error::Utf8` if the source is not UTF-8 and `Error::Io` if reading
    /// the source fails. After an error, `row` is empty and this always
    /// returns `Ok(false)`.
    pub fn read_row(&mut self, row: &mut Row) -> Result<bool> {
        row.clear();
        if self.done {
            return Ok(false);
        }
        let mut start = self.pos.clone();
        let res = {
            let (fields, ends) = row.as_parts();
            loop {
                let input = match self.src.fill() {
                    Ok(input) => input,
                    Err(err) => {
                        self.done = true;
                        fields.clear();
                        ends.clear();
                        return Err(err.at(&start));
                    }
                };
                // The `\n` of a `\r\n` split from its `\r` is not part of
                // this line.
                if self.core.is_after_cr() && input.starts_with('\n') {
                    start.byte += 1;
                }
                let (res, nin) = self.core.read_record(input, fields, ends);
                self.src.consume(nin);
                match res {
                    ReadRecordResult::InputEmpty => continue,
                    ReadRecordResult::UnterminatedQuote => {
                        let field = ends.len() as u64;
                        fields.clear();
                        ends.clear();
                        break Err(field);
                    }
                    res => break Ok(res),
                }
            }
        };
        match res {
            Ok(ReadRecordResult::Record) => {
                trace!("line {}: {} fields", start.line(), row.len());
                row.set_position(Some(start));
                self.pos.line += 1;
                self.pos.byte = self.src.offset();
                Ok(true)
            }
            Ok(_) => {
                self.done = true;
                Ok(false)
            }
            Err(field) => {
                self.done = true;
                let pos = Position { field, ..start };
                warn!(
                    "unterminated quoted field at line {} (physical line {})",
                    pos.line(),
                    self.core.line()
                );
                Err(Error::Malformed { pos })
            }
        }
    }

    /// Returns a borrowed iterator over the remaining rows.
    ///
    /// Each item is a `Result<Row>`. After the first error, the iterator
    /// yields `None`.
    pub fn rows(&mut self) -> RowsIter<R> {
        RowsIter { rdr: self, row: Row::new() }
    }

    /// Returns an owned iterator over the remaining rows.
    pub fn into_rows(self) -> RowsIntoIter<R> {
        RowsIntoIter { rdr: self, row: Row::new() }
    }

    /// Parse the remaining data, pushing every event to `consumer`.
    ///
    /// Events are delivered in document order: `document_begin`, then for
    /// every line `line_begin`, one `field_read` per field and `line_end`,
    /// and finally `document_end`. Parse errors are converted into the
    /// consumer's error type. An error returned by the consumer stops the
    /// parse and is returned as is.
    ///
    /// # Example
    ///
    /// ```
    /// use dsv::{Configuration, Consumer, Parser};
    ///
    /// #[derive(Default)]
    /// struct Widths(Vec<usize>);
    ///
    /// impl Consumer for Widths {
    ///     type Error = dsv::Error;
    ///
    ///     fn field_read(
    ///         &mut self,
    ///         _line: u64,
    ///         field: u64,
    ///         value: &str,
    ///     ) -> dsv::Result<()> {
    ///         let field = field as usize;
    ///         if self.0.len() <= field {
    ///             self.0.resize(field + 1, 0);
    ///         }
    ///         self.0[field] = self.0[field].max(value.chars().count());
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let parser = Parser::from_text(Configuration::default(), "ab,c\nd,efg");
    /// let mut widths = Widths::default();
    /// parser.parse(&mut widths).unwrap();
    /// assert_eq!(widths.0, vec![2, 3]);
    /// ```
    pub fn parse<C: Consumer>(
        mut self,
        consumer: &mut C,
    ) -> result::Result<(), C::Error> {
        debug!("document begin (delimiter {:?})", self.config().delimiter());
        consumer.document_begin()?;
        let mut row = Row::new();
        let mut lines = 0;
        while self.read_row(&mut row)? {
            consumer.line_begin(lines)?;
            for (i, field) in row.iter().enumerate() {
                consumer.field_read(lines, i as u64, field)?;
            }
            consumer.line_end(lines)?;
            lines += 1;
        }
        consumer.document_end()?;
        debug!("document end ({} lines, {} bytes)", lines, self.src.offset());
        Ok(())
    }
}

/// A borrowed iterator over rows.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying
/// parser.
pub struct RowsIter<'r, R: 'r> {
    rdr: &'r mut Parser<R>,
    row: Row,
}

impl<'r, R: io::Read> Iterator for RowsIter<'r, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        match self.rdr.read_row(&mut self.row) {
            Ok(true) => Some(Ok(self.row.clone())),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// An owned iterator over rows.
pub struct RowsIntoIter<R> {
    rdr: Parser<R>,
    row: Row,
}

impl<R: io::Read> RowsIntoIter<R> {
    /// Return a reference to the underlying parser.
    pub fn reader(&self) -> &Parser<R> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying parser.
    pub fn into_reader(self) -> Parser<R> {
        self.rdr
    }
}

impl<R: io::Read> Iterator for RowsIntoIter<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        match self.rdr.read_row(&mut self.row) {
            Ok(true) => Some(Ok(self.row.clone())),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use dsv_core::Configuration;

    use crate::error::Error;
    use crate::row::Row;

    use super::{Consumer, Parser, Position};

    fn semi() -> Configuration {
        Configuration::new(';').unwrap()
    }

    fn parse(config: Configuration, data: &str) -> Vec<Vec<String>> {
        Parser::from_text(config, data)
            .into_rows()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect()
    }

    macro_rules! parses_to {
        ($name:ident, $config:expr, $data:expr, $expected:expr) => {
            #[test]
            fn $name() {
                let expected: Vec<Vec<&str>> = $expected;
                assert_eq!(parse($config, $data), expected);
            }
        };
    }

    parses_to!(empty, semi(), "", vec![]);
    parses_to!(one_field, semi(), "abc", vec![vec!["abc"]]);
    parses_to!(
        empty_fields_kept,
        semi(),
        "a;;b;",
        vec![vec!["a", "", "b", ""]]
    );
    parses_to!(
        doubled_quote,
        semi(),
        "\"z\"\"zz\";;xxx;",
        vec![vec!["z\"zz", "", "xxx", ""]]
    );
    parses_to!(
        cr_terminator,
        Configuration::default(),
        "a,b\rc,d",
        vec![vec!["a", "b"], vec!["c", "d"]]
    );
    parses_to!(
        lf_terminator,
        Configuration::default(),
        "a,b\nc,d",
        vec![vec!["a", "b"], vec!["c", "d"]]
    );
    parses_to!(
        crlf_terminator,
        Configuration::default(),
        "a,b\r\nc,d\r\n",
        vec![vec!["a", "b"], vec!["c", "d"]]
    );
    parses_to!(
        newline_in_quotes,
        Configuration::default(),
        "\"line1\nline2\",x",
        vec![vec!["line1\nline2", "x"]]
    );
    parses_to!(
        empty_line,
        Configuration::default(),
        "a\n\nb",
        vec![vec!["a"], vec![""], vec!["b"]]
    );
    parses_to!(
        ragged,
        Configuration::default(),
        "a\nb,c,d\ne,f",
        vec![vec!["a"], vec!["b", "c", "d"], vec!["e", "f"]]
    );

    #[test]
    fn positions() {
        let data = "a,b\nc\r\n\"d\ne\"\nf";
        let mut parser = Parser::from_text(Configuration::default(), data);
        let mut row = Row::new();
        let mut got = vec![];
        while parser.read_row(&mut row).unwrap() {
            let pos = row.position().unwrap();
            got.push((pos.line(), pos.byte(), pos.field()));
        }
        assert_eq!(got, vec![(0, 0, 0), (1, 4, 0), (2, 7, 0), (3, 13, 0)]);
        assert_eq!(parser.position().line(), 4);
        assert!(parser.is_done());
    }

    #[test]
    fn malformed_is_terminal() {
        let data = "a,b\nc,\"d";
        let mut parser = Parser::from_text(Configuration::default(), data);
        let mut row = Row::new();

        assert!(parser.read_row(&mut row).unwrap());
        assert_eq!(row, vec!["a", "b"]);
        match parser.read_row(&mut row) {
            Err(Error::Malformed { pos }) => {
                assert_eq!(pos, Position::new(4, 1, 1));
            }
            res => panic!("unexpected result: {:?}", res),
        }
        assert!(row.is_empty());
        assert!(!parser.read_row(&mut row).unwrap());
    }

    #[test]
    fn malformed_after_crlf() {
        let mut parser =
            Parser::from_text(Configuration::default(), "a\r\n\"b");
        let mut row = Row::new();

        assert!(parser.read_row(&mut row).unwrap());
        match parser.read_row(&mut row) {
            Err(Error::Malformed { pos }) => {
                assert_eq!(pos, Position::new(3, 1, 0));
            }
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn rows_stop_after_error() {
        let mut parser =
            Parser::from_text(Configuration::default(), "a\n\"b\n");
        let results: Vec<_> = parser.rows().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(parser.rows().next().is_none());
    }

    #[test]
    fn invalid_utf8_has_position() {
        let data = &b"a,b\nc,\xFF\n"[..];
        let mut parser =
            Parser::from_reader(Configuration::default(), io::Cursor::new(data));
        let mut row = Row::new();

        assert!(parser.read_row(&mut row).unwrap());
        match parser.read_row(&mut row) {
            Err(Error::Utf8 { pos: Some(pos), err }) => {
                assert_eq!(pos.line(), 1);
                assert_eq!(pos.byte(), 4);
                assert_eq!(err.offset(), 6);
            }
            res => panic!("unexpected result: {:?}", res),
        }
        assert!(!parser.read_row(&mut row).unwrap());
    }

    #[derive(Default)]
    struct Events(Vec<String>);

    impl Consumer for Events {
        type Error = Error;

        fn document_begin(&mut self) -> Result<(), Error> {
            self.0.push("begin".to_string());
            Ok(())
        }

        fn document_end(&mut self) -> Result<(), Error> {
            self.0.push("end".to_string());
            Ok(())
        }

        fn line_begin(&mut self, line: u64) -> Result<(), Error> {
            self.0.push(format!("line {}", line));
            Ok(())
        }

        fn line_end(&mut self, line: u64) -> Result<(), Error> {
            self.0.push(format!("/line {}", line));
            Ok(())
        }

        fn field_read(
            &mut self,
            line: u64,
            field: u64,
            value: &str,
        ) -> Result<(), Error> {
            self.0.push(format!("{}:{}={}", line, field, value));
            Ok(())
        }
    }

    #[test]
    fn consumer_events() {
        let parser = Parser::from_text(semi(), "a;b\n;");
        let mut events = Events::default();
        parser.parse(&mut events).unwrap();
        assert_eq!(
            events.0,
            vec![
                "begin", "line 0", "0:0=a", "0:1=b", "/line 0", "line 1",
                "1:0=", "1:1=", "/line 1", "end",
            ]
        );
    }

    #[test]
    fn consumer_empty_document() {
        let parser = Parser::from_text(semi(), "");
        let mut events = Events::default();
        parser.parse(&mut events).unwrap();
        assert_eq!(events.0, vec!["begin", "end"]);
    }

    #[test]
    fn consumer_malformed_line_has_no_events() {
        let parser = Parser::from_text(semi(), "a\n\"b;c");
        let mut events = Events::default();
        match parser.parse(&mut events) {
            Err(Error::Malformed { pos }) => assert_eq!(pos.line(), 1),
            res => panic!("unexpected result: {:?}", res),
        }
        assert_eq!(events.0, vec!["begin", "line 0", "0:0=a", "/line 0"]);
    }
}
