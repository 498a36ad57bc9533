use crate::{is_terminator, Configuration, QUOTE};

/// An incremental, push based parser for delimited text.
///
/// The parser is a finite state machine. Callers feed it chunks of decoded
/// text and it reports where fields and records end. Unescaped field data
/// is appended to a caller provided `String`. Chunks may be split anywhere
/// (even between the `\r` and `\n` of a CRLF terminator) without changing
/// the parse.
///
/// An empty input chunk tells the parser that there is no more data. The
/// caller should keep passing empty chunks until `End` (or
/// `UnterminatedQuote`) is returned.
///
/// # Format
///
/// * `\r`, `\n` and `\r\n` each end a record, except inside quoted fields,
///   where they are field data.
/// * A field starting with `"` is quoted. Inside it, `""` is a literal
///   quote and a lone `"` closes the field. Anything after the closing quote
///   and before the next delimiter or terminator is dropped.
/// * A `"` that does not start a field is ordinary data.
/// * An empty line is a record with one empty field. A terminator at the
///   very end of the data does not start another record.
/// * Records may have differing numbers of fields.
///
/// The only input this parser rejects is a quoted field that is still open
/// when the data ends.
#[derive(Clone, Debug)]
pub struct Reader {
    /// The dialect in use.
    config: Configuration,
    /// Copied out of `config` since it is consulted on every character.
    delimiter: char,
    /// The current state of the machine.
    state: State,
    /// The current line number, as measured by occurrences of `\n`.
    line: u64,
}

impl Default for Reader {
    fn default() -> Reader {
        Reader::new(Configuration::default())
    }
}

/// The result of parsing at most one field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadFieldResult {
    /// The input was exhausted before the end of a field was found.
    InputEmpty,
    /// The end of a field was found.
    ///
    /// When `record_end` is true, this field is also the last field of its
    /// record.
    Field {
        /// Whether this was the last field in a record or not.
        record_end: bool,
    },
    /// All data has been read.
    ///
    /// This can only be returned when an empty input chunk is provided.
    End,
    /// The data ended inside a quoted field.
    ///
    /// The field data accumulated for the open field is incomplete. Once
    /// this is returned, every subsequent call returns it again.
    UnterminatedQuote,
}

impl ReadFieldResult {
    fn from_state(state: State) -> ReadFieldResult {
        match state {
            State::End => ReadFieldResult::End,
            State::Unterminated => ReadFieldResult::UnterminatedQuote,
            State::EndRecord | State::CRLF => {
                ReadFieldResult::Field { record_end: true }
            }
            State::EndFieldDelim => {
                ReadFieldResult::Field { record_end: false }
            }
            _ => {
                debug_assert!(!state.is_field_final());
                ReadFieldResult::InputEmpty
            }
        }
    }
}

/// The result of parsing at most one record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadRecordResult {
    /// The input was exhausted before the end of a record was found.
    InputEmpty,
    /// The end of a record was found.
    Record,
    /// All data has been read.
    ///
    /// This can only be returned when an empty input chunk is provided.
    End,
    /// The data ended inside a quoted field.
    ///
    /// Once this is returned, every subsequent call returns it again.
    UnterminatedQuote,
}

impl ReadRecordResult {
    fn from_state(state: State) -> ReadRecordResult {
        match state {
            State::End => ReadRecordResult::End,
            State::Unterminated => ReadRecordResult::UnterminatedQuote,
            State::EndRecord | State::CRLF => ReadRecordResult::Record,
            _ => {
                debug_assert!(!state.is_record_final());
                ReadRecordResult::InputEmpty
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// Nothing of the next record has been seen.
    StartRecord,
    /// At the start of a field that is not the first of its record.
    StartField,
    /// Inside an unquoted field.
    InField,
    /// Inside a quoted field.
    InQuotedField,
    /// Just saw a quote inside a quoted field. It either closes the field
    /// or is the first half of an escaped quote.
    QuoteInQuotedField,
    /// The quoted field is closed but its delimiter has not been seen.
    AfterQuotedField,
    /// A field ended on a delimiter.
    EndFieldDelim,
    /// A field ended on a terminator that has not been consumed yet.
    InRecordTerm,
    /// A record ended on `\n`.
    EndRecord,
    /// A record ended on `\r`. A `\n` that follows is part of the same
    /// terminator.
    CRLF,
    /// All data has been read.
    End,
    /// The data ended inside a quoted field.
    Unterminated,
}

impl State {
    fn is_field_final(&self) -> bool {
        match *self {
            State::End
            | State::Unterminated
            | State::EndRecord
            | State::CRLF
            | State::EndFieldDelim => true,
            _ => false,
        }
    }

    fn is_record_final(&self) -> bool {
        match *self {
            State::End
            | State::Unterminated
            | State::EndRecord
            | State::CRLF => true,
            _ => false,
        }
    }

    fn is_terminal(&self) -> bool {
        *self == State::End || *self == State::Unterminated
    }
}

impl Reader {
    /// Create a new parser for the given dialect.
    pub fn new(config: Configuration) -> Reader {
        Reader {
            config,
            delimiter: config.delimiter(),
            state: State::StartRecord,
            line: 1,
        }
    }

    /// The dialect this parser was built with.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Return the current line number as measured by the number of
    /// occurrences of `\n`, including those inside quoted fields.
    ///
    /// Line numbers start at `1`.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Returns true if the last record ended on `\r`.
    ///
    /// A `\n` at the start of the next input is then the rest of that
    /// terminator and does not belong to the next record.
    pub fn is_after_cr(&self) -> bool {
        self.state == State::CRLF
    }

    /// Parse `input` and append the unescaped data of at most one field to
    /// `output`.
    ///
    /// Returns the outcome and the number of bytes of `input` consumed. The
    /// caller must pass the unconsumed remainder back in on the next call.
    ///
    /// When `Field` is returned, the field's data is everything appended to
    /// `output` since the previous `Field` was returned.
    pub fn read_field(
        &mut self,
        input: &str,
        output: &mut String,
    ) -> (ReadFieldResult, usize) {
        if input.is_empty() || self.state.is_terminal() {
            self.state = self.transition_final(self.state);
            return (ReadFieldResult::from_state(self.state), 0);
        }
        let mut nin = 0;
        let mut state = self.state;
        while let Some(c) = input[nin..].chars().next() {
            let (s, consumed, out) = self.transition(state, c);
            if out {
                output.push(c);
            }
            if consumed {
                nin += c.len_utf8();
                self.line += (c == '\n') as u64;
            }
            state = s;
            if state.is_field_final() {
                break;
            }
        }
        self.state = state;
        (ReadFieldResult::from_state(state), nin)
    }

    /// Parse `input` and append the unescaped data of at most one record to
    /// `output`.
    ///
    /// Every time a field ends, the length of `output` is pushed onto
    /// `ends`. If the caller clears `output` and `ends` after each record,
    /// field `i` of the record is `output[ends[i - 1]..ends[i]]` (with
    /// `ends[-1]` taken as `0`).
    ///
    /// Returns the outcome and the number of bytes of `input` consumed.
    pub fn read_record(
        &mut self,
        input: &str,
        output: &mut String,
        ends: &mut Vec<usize>,
    ) -> (ReadRecordResult, usize) {
        if input.is_empty() || self.state.is_terminal() {
            let s = self.transition_final(self.state);
            if s == State::EndRecord {
                ends.push(output.len());
            }
            self.state = s;
            return (ReadRecordResult::from_state(s), 0);
        }
        let mut nin = 0;
        let mut state = self.state;
        while let Some(c) = input[nin..].chars().next() {
            let (s, consumed, out) = self.transition(state, c);
            if out {
                output.push(c);
            }
            if consumed {
                nin += c.len_utf8();
                self.line += (c == '\n') as u64;
            }
            state = s;
            if state.is_field_final() {
                ends.push(output.len());
                if state != State::EndFieldDelim {
                    break;
                }
            }
        }
        self.state = state;
        (ReadRecordResult::from_state(state), nin)
    }

    /// The state entered once all data has been seen.
    fn transition_final(&self, state: State) -> State {
        use self::State::*;
        match state {
            End | StartRecord | EndRecord | CRLF => End,
            StartField
            | EndFieldDelim
            | InField
            | QuoteInQuotedField
            | AfterQuotedField
            | InRecordTerm => EndRecord,
            InQuotedField | Unterminated => Unterminated,
        }
    }

    /// Compute the next state for `c`.
    ///
    /// Also returns whether `c` was consumed and whether it belongs in the
    /// field data. Transitions that do not consume `c` are epsilon
    /// transitions; the same character is offered to the next state.
    #[inline(always)]
    fn transition(&self, state: State, c: char) -> (State, bool, bool) {
        use self::State::*;
        match state {
            End => (End, false, false),
            Unterminated => (Unterminated, false, false),
            StartRecord => (StartField, false, false),
            EndRecord => (StartRecord, false, false),
            EndFieldDelim => (StartField, false, false),
            StartField => {
                if c == QUOTE {
                    (InQuotedField, true, false)
                } else if c == self.delimiter {
                    (EndFieldDelim, true, false)
                } else if is_terminator(c) {
                    (InRecordTerm, false, false)
                } else {
                    (InField, true, true)
                }
            }
            InField => {
                if c == self.delimiter {
                    (EndFieldDelim, true, false)
                } else if is_terminator(c) {
                    (InRecordTerm, false, false)
                } else {
                    (InField, true, true)
                }
            }
            InQuotedField => {
                if c == QUOTE {
                    (QuoteInQuotedField, true, false)
                } else {
                    (InQuotedField, true, true)
                }
            }
            QuoteInQuotedField => {
                if c == QUOTE {
                    (InQuotedField, true, true)
                } else if c == self.delimiter {
                    (EndFieldDelim, true, false)
                } else if is_terminator(c) {
                    (InRecordTerm, false, false)
                } else {
                    (AfterQuotedField, true, false)
                }
            }
            AfterQuotedField => {
                if c == self.delimiter {
                    (EndFieldDelim, true, false)
                } else if is_terminator(c) {
                    (InRecordTerm, false, false)
                } else {
                    (AfterQuotedField, true, false)
                }
            }
            InRecordTerm => {
                if c == '\r' {
                    (CRLF, true, false)
                } else {
                    (EndRecord, true, false)
                }
            }
            CRLF => {
                if c == '\n' {
                    (StartRecord, true, false)
                } else {
                    (StartRecord, false, false)
                }
            }
        }
    }
}
