use memchr::{memchr, memchr3};

use crate::{is_terminator, Configuration, QUOTE, TERMINATOR};

/// A writer for delimited text.
///
/// The writer appends serialized fields to a caller provided `String`.
/// Fields are quoted only when they contain the delimiter, a quote or a
/// line terminator, and quotes inside quoted fields are doubled.
///
/// Records are separated by `\n`, which is written at the start of every
/// record except the first. The output therefore never ends with a
/// terminator.
///
/// # Caveat
///
/// Records are not required to have the same number of fields. A record
/// with no fields and a final record holding a single empty field both
/// serialize to nothing, so a parser cannot tell them apart from the
/// absence of a record.
#[derive(Clone, Debug)]
pub struct Writer {
    config: Configuration,
    first_field_in_record: bool,
    records: u64,
}

impl Default for Writer {
    fn default() -> Writer {
        Writer::new(Configuration::default())
    }
}

impl Writer {
    /// Creates a new writer for the given dialect.
    pub fn new(config: Configuration) -> Writer {
        Writer { config, first_field_in_record: true, records: 0 }
    }

    /// The dialect this writer was built with.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The number of records started so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Start a new record.
    ///
    /// If a record was started before, the record terminator is appended to
    /// `output` first.
    pub fn begin_record(&mut self, output: &mut String) {
        if self.records > 0 {
            output.push(TERMINATOR);
        }
        self.records += 1;
        self.first_field_in_record = true;
    }

    /// Append a single field of the current record to `output`, preceded by
    /// a delimiter if it isn't the first field of the record.
    pub fn write_field(&mut self, field: &str, output: &mut String) {
        if !self.first_field_in_record {
            output.push(self.config.delimiter());
        }
        self.first_field_in_record = false;
        if needs_quotes(&self.config, field) {
            quote(field, output);
        } else {
            output.push_str(field);
        }
    }
}

/// Returns true if and only if `field` must be quoted to survive a round
/// trip through a parser using `config`.
pub fn needs_quotes(config: &Configuration, field: &str) -> bool {
    match config.ascii_delimiter() {
        // Every byte of a multi-byte UTF-8 sequence is non-ASCII, so a
        // bytewise search can't produce a false positive.
        Some(delim) => {
            let bytes = field.as_bytes();
            memchr3(delim, b'"', b'\n', bytes).is_some()
                || memchr(b'\r', bytes).is_some()
        }
        None => field.chars().any(|c| {
            c == config.delimiter() || c == QUOTE || is_terminator(c)
        }),
    }
}

/// Append `field` to `output` wrapped in quotes, doubling every quote inside
/// it.
pub fn quote(mut field: &str, output: &mut String) {
    output.reserve(field.len() + 2);
    output.push(QUOTE);
    while let Some(next_quote) = memchr(b'"', field.as_bytes()) {
        output.push_str(&field[..next_quote]);
        output.push(QUOTE);
        output.push(QUOTE);
        field = &field[next_quote + 1..];
    }
    output.push_str(field);
    output.push(QUOTE);
}
