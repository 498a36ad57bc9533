use std::fmt;

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::row::Row;

/// A row serializes as a sequence of strings. Its position is not included.
impl Serialize for Row {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for field in self {
            seq.serialize_element(field)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Row, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a sequence of strings")
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Row, A::Error> {
                let fields = seq.size_hint().unwrap_or(0).min(1024);
                let mut row = Row::with_capacity(0, fields);
                while let Some(field) = seq.next_element::<String>()? {
                    row.push_field(&field);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_seq(RowVisitor)
    }
}
