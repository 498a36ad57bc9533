/*!
The `dsv` crate provides a streaming parser and writer for CSV and other
delimiter-separated data.

Data is processed one line at a time. A [`Parser`] hands lines out either
by pull, as [`Row`]s, or by push, as events delivered to a [`Consumer`].
A [`Writer`] serializes lines to any `io::Write`, quoting a field only when
it contains the delimiter, a quote or a line terminator.

# Format

* Fields are separated by a configurable delimiter (`,` by default). The
  delimiter may be any character except `"`, `\r` and `\n`.
* A line ends at `\r`, `\n` or `\r\n`. The writer always uses `\n`, and
  only between lines.
* A field that starts with `"` is quoted. It may contain the delimiter,
  line terminators and doubled quotes (`""`), which stand for one `"`.
* An empty line is a line with one empty field. Lines may have differing
  numbers of fields.
* The only input that is rejected is a quoted field that is still open at
  the end of the data.

# Example: reading

```
use dsv::{Configuration, Parser};

# fn main() { example().unwrap(); }
fn example() -> dsv::Result<()> {
    let data = "\
city,region
\"Anytown, WW\",north
Smalltown,\"\"
";
    let mut parser = Parser::from_text(Configuration::default(), data);
    for result in parser.rows() {
        let row = result?;
        println!("{:?}", row);
    }
    Ok(())
}
```

# Example: writing

```
use dsv::{Configuration, Writer};

# fn main() { example().unwrap(); }
fn example() -> dsv::Result<()> {
    let config = Configuration::new('\t')?;
    let mut wtr = Writer::from_writer(config, vec![]);
    wtr.write_line(&["id", "comment"])?;
    wtr.write_line(&["1", "tab\there"])?;
    wtr.flush()?;
    assert_eq!(wtr.get_ref().as_slice(), &b"id\tcomment\n1\t\"tab\there\""[..]);
    Ok(())
}
```
*/

#![deny(missing_docs)]

pub use dsv_core::{Configuration, InvalidDelimiter};

pub use crate::error::{Error, IntoInnerError, Result, Utf8Error};
pub use crate::reader::{Consumer, Parser, Position, RowsIntoIter, RowsIter};
pub use crate::row::{Row, RowIter};
pub use crate::writer::Writer;

mod decoder;
mod error;
mod reader;
mod row;
#[cfg(feature = "serde")]
mod serde_impl;
mod writer;
