use std::io;
use std::str;

use bstr::ByteSlice;

use crate::error::{Error, Result, Utf8Error};

const BUF_SIZE: usize = 1024 * 64;

/// Incrementally decodes an `io::Read` into UTF-8 text.
///
/// The buffer is laid out as follows:
///
/// ```text
/// [consumed | start..valid: validated text | valid..end: undecided bytes]
/// ```
///
/// Bytes in `valid..end` are the start of a multi-byte sequence that was
/// split by a read. They are moved to the front of the buffer before the
/// next read.
#[derive(Debug)]
pub(crate) struct Decoder<R> {
    rdr: R,
    buf: Vec<u8>,
    start: usize,
    valid: usize,
    end: usize,
    eof: bool,
    /// The offset of `buf[start]` from the beginning of the source.
    offset: u64,
    /// Set once invalid UTF-8 has been found. Reported after all text
    /// before it has been handed out.
    invalid: Option<Utf8Error>,
}

impl Decoder<io::Empty> {
    /// Wrap text that is already decoded. It is handed out as one chunk.
    pub fn from_text(text: String) -> Decoder<io::Empty> {
        let buf = text.into_bytes();
        let end = buf.len();
        Decoder {
            rdr: io::empty(),
            buf,
            start: 0,
            valid: end,
            end,
            eof: true,
            offset: 0,
            invalid: None,
        }
    }
}

impl<R: io::Read> Decoder<R> {
    pub fn new(rdr: R) -> Decoder<R> {
        Decoder {
            rdr,
            buf: vec![0; BUF_SIZE],
            start: 0,
            valid: 0,
            end: 0,
            eof: false,
            offset: 0,
            invalid: None,
        }
    }

    /// Return the next chunk of decoded text.
    ///
    /// An empty chunk means the source is exhausted.
    pub fn fill(&mut self) -> Result<&str> {
        while self.start == self.valid {
            if let Some(ref err) = self.invalid {
                return Err(Error::Utf8 { pos: None, err: err.clone() });
            }
            if self.eof {
                return Ok("");
            }
            self.refill()?;
        }
        let text = &self.buf[self.start..self.valid];
        // SAFETY: `valid` only ever covers bytes that were checked to be
        // UTF-8 (or came from a `String`), and `consume` only lands on char
        // boundaries of the text handed out here.
        Ok(unsafe { str::from_utf8_unchecked(text) })
    }

    /// Mark `n` bytes of the last chunk returned by `fill` as used.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(self.start + n <= self.valid);
        self.start += n;
        self.offset += n as u64;
    }

    /// The number of bytes of the source consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn get_ref(&self) -> &R {
        &self.rdr
    }

    fn refill(&mut self) -> Result<()> {
        debug_assert_eq!(self.start, self.valid);
        self.buf.copy_within(self.valid..self.end, 0);
        self.end -= self.valid;
        self.start = 0;
        self.valid = 0;

        let n = loop {
            match self.rdr.read(&mut self.buf[self.end..]) {
                Ok(n) => break n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {
                    continue
                }
                Err(err) => return Err(Error::Io(err)),
            }
        };
        if n == 0 {
            self.eof = true;
            if self.end > 0 {
                let bytes = self.buf[..self.end].to_vec();
                self.invalid = Some(Utf8Error::new(self.offset, bytes));
            }
            return Ok(());
        }
        self.end += n;
        match self.buf[..self.end].to_str() {
            Ok(_) => self.valid = self.end,
            Err(err) => {
                self.valid = err.valid_up_to();
                if let Some(len) = err.error_len() {
                    let bad = self.buf[self.valid..self.valid + len].to_vec();
                    let offset = self.offset + self.valid as u64;
                    self.invalid = Some(Utf8Error::new(offset, bad));
                }
            }
        }
        Ok(())
    }
}
