use std::fs::File;
use std::io;
use std::path::Path;

use dsv_core::{Configuration, Writer as CoreWriter};
use log::{debug, trace, warn};

use crate::error::{Error, IntoInnerError, Result};
use crate::row::Row;

/// A writer for delimited data.
///
/// Each line is serialized into an internal buffer and handed to the
/// underlying sink with a single `write_all` call. The sink is not buffered
/// beyond that, so wrapping a slow sink in an `io::BufWriter` is usually a
/// good idea.
///
/// Lines are separated by `\n`, which is written before every line except
/// the first. The output therefore never ends with a line terminator.
///
/// # Example
///
/// ```
/// use dsv::{Configuration, Writer};
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let mut wtr = Writer::from_writer(Configuration::default(), vec![]);
///     wtr.write_line(&["a", "b,c"])?;
///     wtr.write_line(&["say \"hi\"", ""])?;
///
///     let data = String::from_utf8(wtr.into_inner()?)?;
///     assert_eq!(data, "a,\"b,c\"\n\"say \"\"hi\"\"\",");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    core: CoreWriter,
    buf: String,
    wtr: W,
}

impl Writer<io::BufWriter<File>> {
    /// Create a writer that writes to the file at the given path.
    ///
    /// The file is truncated if it already exists.
    pub fn from_path<P: AsRef<Path>>(
        config: Configuration,
        path: P,
    ) -> Result<Writer<io::BufWriter<File>>> {
        let file = File::create(path)?;
        Ok(Writer::from_writer(config, io::BufWriter::new(file)))
    }
}

impl<W: io::Write> Writer<W> {
    /// Create a writer that writes to `wtr`.
    pub fn from_writer(config: Configuration, wtr: W) -> Writer<W> {
        Writer { core: CoreWriter::new(config), buf: String::new(), wtr }
    }

    /// The dialect this writer was built with.
    pub fn config(&self) -> &Configuration {
        self.core.config()
    }

    /// The number of lines written so far, including a line whose write
    /// failed.
    pub fn lines(&self) -> u64 {
        self.core.records()
    }

    /// Write one line made of the given fields.
    ///
    /// Fields are quoted only when they must be. A line with no fields
    /// writes nothing but its separating terminator.
    ///
    /// # Errors
    ///
    /// If the sink fails, the error is returned as `Error::Io`. Part of the
    /// line may have reached the sink.
    pub fn write_line<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.buf.clear();
        self.core.begin_record(&mut self.buf);
        for field in fields {
            self.core.write_field(field.as_ref(), &mut self.buf);
        }
        trace!("writing line {} ({} bytes)", self.lines() - 1, self.buf.len());
        if let Err(err) = self.wtr.write_all(self.buf.as_bytes()) {
            warn!("failed to write line {}: {}", self.lines() - 1, err);
            return Err(Error::Io(err));
        }
        Ok(())
    }

    /// Write a row as one line.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        self.write_line(row)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }

    /// A reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.wtr
    }

    /// Flush the sink and return it.
    ///
    /// If flushing fails, the writer is returned inside the error.
    pub fn into_inner(
        mut self,
    ) -> std::result::Result<W, IntoInnerError<Writer<W>>> {
        match self.wtr.flush() {
            Ok(()) => {
                debug!("writer finished after {} lines", self.lines());
                Ok(self.wtr)
            }
            Err(err) => Err(IntoInnerError::new(self, err)),
        }
    }
}
