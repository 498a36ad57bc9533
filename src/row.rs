use std::fmt;
use std::iter::FromIterator;
use std::ops::{self, Range};

use crate::reader::Position;

/// A single line of delimited data: an ordered sequence of fields.
///
/// All fields are stored in one contiguous buffer alongside the offset at
/// which each field ends, so reading many rows into the same `Row` does not
/// allocate once the buffers have grown large enough.
///
/// Rows read by a `Parser` remember the position they were read from.
/// Comparison ignores that position.
#[derive(Clone)]
pub struct Row {
    /// All fields in this row, stored contiguously.
    fields: String,
    /// The ending offset of each field in `fields`. Always on character
    /// boundaries.
    ends: Vec<usize>,
    /// Where this row was parsed, if it was parsed at all.
    pos: Option<Position>,
}

impl Default for Row {
    fn default() -> Row {
        Row::new()
    }
}

impl Row {
    /// Create a new empty `Row`.
    pub fn new() -> Row {
        Row::with_capacity(0, 0)
    }

    /// Create a new empty `Row` with room for `buffer` bytes of field data
    /// spread over `fields` fields.
    pub fn with_capacity(buffer: usize, fields: usize) -> Row {
        Row {
            fields: String::with_capacity(buffer),
            ends: Vec::with_capacity(fields),
            pos: None,
        }
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.range(i).map(|range| &self.fields[range])
    }

    /// Returns true if and only if this row has no fields.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Returns the number of fields in this row.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Clear this row so that it has zero fields and no position.
    ///
    /// It is not necessary to clear a row before handing it to
    /// `Parser::read_row`.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.ends.clear();
        self.pos = None;
    }

    /// Add a new field to the end of this row.
    pub fn push_field(&mut self, field: &str) {
        self.fields.push_str(field);
        self.ends.push(self.fields.len());
    }

    /// Returns an iterator over all fields in this row.
    pub fn iter(&self) -> RowIter {
        RowIter { row: self, start: 0, i: 0 }
    }

    /// The position at which this row was parsed, if it came from a parser.
    pub fn position(&self) -> Option<&Position> {
        self.pos.as_ref()
    }

    /// Set the position of this row.
    pub fn set_position(&mut self, pos: Option<Position>) {
        self.pos = pos;
    }

    /// Return the field data of every field, concatenated.
    pub fn as_str(&self) -> &str {
        &self.fields
    }

    /// Retrieve the buffers a parser fills in.
    pub(crate) fn as_parts(&mut self) -> (&mut String, &mut Vec<usize>) {
        (&mut self.fields, &mut self.ends)
    }

    /// Returns the bounds of field `i`.
    fn range(&self, i: usize) -> Option<Range<usize>> {
        let end = *self.ends.get(i)?;
        let start = match i.checked_sub(1) {
            None => 0,
            Some(prev) => self.ends[prev],
        };
        Some(Range { start, end })
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fields: Vec<&str> = self.iter().collect();
        f.debug_struct("Row")
            .field("pos", &self.pos)
            .field("fields", &fields)
            .finish()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Row) -> bool {
        self.ends == other.ends && self.fields == other.fields
    }
}

impl Eq for Row {}

impl<T: AsRef<str>> PartialEq<[T]> for Row {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'a, T: AsRef<str>> PartialEq<&'a [T]> for Row {
    fn eq(&self, other: &&'a [T]) -> bool {
        self == *other
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for Row {
    fn eq(&self, other: &Vec<T>) -> bool {
        self == other.as_slice()
    }
}

impl ops::Index<usize> for Row {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        match self.get(i) {
            Some(field) => field,
            None => panic!(
                "field index {} out of bounds for row with {} fields",
                i,
                self.len()
            ),
        }
    }
}

impl<T: AsRef<str>> From<Vec<T>> for Row {
    fn from(fields: Vec<T>) -> Row {
        Row::from_iter(fields)
    }
}

impl<'a, T: AsRef<str>> From<&'a [T]> for Row {
    fn from(fields: &'a [T]) -> Row {
        Row::from_iter(fields)
    }
}

impl<T: AsRef<str>> FromIterator<T> for Row {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Row {
        let mut row = Row::new();
        row.extend(iter);
        row
    }
}

impl<T: AsRef<str>> Extend<T> for Row {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for field in iter {
            self.push_field(field.as_ref());
        }
    }
}

impl<'a> IntoIterator for &'a Row {
    type IntoIter = RowIter<'a>;
    type Item = &'a str;

    fn into_iter(self) -> RowIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a row.
///
/// The `'r` lifetime refers to the lifetime of the `Row` being iterated.
pub struct RowIter<'r> {
    row: &'r Row,
    start: usize,
    i: usize,
}

impl<'r> Iterator for RowIter<'r> {
    type Item = &'r str;

    fn next(&mut self) -> Option<&'r str> {
        let end = *self.row.ends.get(self.i)?;
        let field = &self.row.fields[self.start..end];
        self.start = end;
        self.i += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.row.len() - self.i;
        (remaining, Some(remaining))
    }
}

impl<'r> ExactSizeIterator for RowIter<'r> {}

#[cfg(test)]
mod tests {
    use crate::reader::Position;

    use super::Row;

    #[test]
    fn row_1() {
        let mut row = Row::new();
        row.push_field("foo");

        assert_eq!(row.len(), 1);
        assert_eq!(row.get(0), Some("foo"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), None);
    }

    #[test]
    fn row_2() {
        let mut row = Row::new();
        row.push_field("foo");
        row.push_field("quux");

        assert_eq!(row.len(), 2);
        assert_eq!(row.get(0), Some("foo"));
        assert_eq!(row.get(1), Some("quux"));
        assert_eq!(row.get(2), None);
        assert_eq!(&row[1], "quux");
    }

    #[test]
    fn empty_row() {
        let row = Row::new();

        assert!(row.is_empty());
        assert_eq!(row.len(), 0);
        assert_eq!(row.get(0), None);
        assert_eq!(row.iter().count(), 0);
    }

    #[test]
    fn empty_fields() {
        let row = Row::from(vec!["", "", ""]);

        assert_eq!(row.len(), 3);
        assert_eq!(row.get(0), Some(""));
        assert_eq!(row.get(2), Some(""));
        assert_eq!(row.get(3), None);
    }

    #[test]
    fn empty_surround() {
        let row = Row::from(vec!["", "foo", ""]);

        assert_eq!(row.len(), 3);
        assert_eq!(row.get(0), Some(""));
        assert_eq!(row.get(1), Some("foo"));
        assert_eq!(row.get(2), Some(""));
        assert_eq!(row.as_str(), "foo");
    }

    #[test]
    fn non_ascii_fields() {
        let row: Row = vec!["ʤ", "a\r\nb", "\"q\""].into_iter().collect();

        assert_eq!(row.iter().collect::<Vec<_>>(), vec!["ʤ", "a\r\nb", "\"q\""]);
        assert_eq!(row.iter().len(), 3);
    }

    #[test]
    fn equality_ignores_position() {
        let mut a = Row::from(vec!["a", "b"]);
        let b = Row::from(vec!["a", "b"]);
        a.set_position(Some(Position::new(10, 2, 0)));

        assert_eq!(a, b);
        assert_eq!(a, vec!["a", "b"]);
        assert_ne!(a, vec!["ab"]);
        assert_ne!(Row::from(vec!["ab", ""]), Row::from(vec!["a", "b"]));
    }

    #[test]
    fn clear_resets_position() {
        let mut row = Row::from(vec!["a"]);
        row.set_position(Some(Position::new(0, 0, 0)));
        row.clear();

        assert!(row.is_empty());
        assert!(row.position().is_none());
        row.extend(vec!["x".to_string()]);
        assert_eq!(row, vec!["x"]);
    }

    #[test]
    #[should_panic]
    fn index_out_of_bounds() {
        let row = Row::from(vec!["a"]);
        let _ = &row[1];
    }
}
