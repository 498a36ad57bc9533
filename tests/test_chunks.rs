use std::io::{self, Read};

use dsv::{Configuration, Parser, Row};

/// A reader that hands out its data in the given chunks, one chunk per
/// `read` call.
#[derive(Debug)]
struct ChunkReader<'a> {
    chunks: Vec<&'a [u8]>,
}

impl<'a> Read for ChunkReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.chunks.is_empty() {
            return Ok(0);
        }
        let chunk = self.chunks[0];
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n == chunk.len() {
            self.chunks.remove(0);
        } else {
            self.chunks[0] = &chunk[n..];
        }
        Ok(n)
    }
}

fn parse_chunks(chunks: Vec<&[u8]>) -> Vec<Row> {
    Parser::from_reader(Configuration::default(), ChunkReader { chunks })
        .into_rows()
        .collect::<dsv::Result<_>>()
        .unwrap()
}

#[test]
fn test_chunks() {
    let rows = parse_chunks(vec![
        &b"col_a,col_b,col_c\n0aaaa,0bbbb,0cccc\n1aaaa,1bbbb,1cc"[..],
        &b"cc\n"[..],
        &b"2aaaa,2bbbb"[..],
        &b",2cccc\r"[..],
        &b"\n3aaaa,3bbbb,3cccc\n4aaaa,4bbbb,4cccc\n5aaaa,5bb"[..],
        &b"bb,5cccc"[..],
        &b"\n"[..],
        &b"6aaa"[..],
    ]);
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0], vec!["col_a", "col_b", "col_c"]);
    assert_eq!(rows[1], vec!["0aaaa", "0bbbb", "0cccc"]);
    assert_eq!(rows[2], vec!["1aaaa", "1bbbb", "1cccc"]);
    assert_eq!(rows[3], vec!["2aaaa", "2bbbb", "2cccc"]);
    assert_eq!(rows[4], vec!["3aaaa", "3bbbb", "3cccc"]);
    assert_eq!(rows[5], vec!["4aaaa", "4bbbb", "4cccc"]);
    assert_eq!(rows[6], vec!["5aaaa", "5bbbb", "5cccc"]);
    assert_eq!(rows[7], vec!["6aaa"]);
}

#[test]
fn test_chunks_split_quotes() {
    let rows = parse_chunks(vec![
        &b"\"a"[..],
        &b"\""[..],
        &b"\"b\""[..],
        &b",\"c\r"[..],
        &b"\nd\"\r"[..],
        &b"\ne"[..],
    ]);
    assert_eq!(rows, vec![vec!["a\"b", "c\r\nd"], vec!["e"]]);
}

#[test]
fn test_chunks_split_utf8() {
    let data = "ʤ,→\n😀,x".as_bytes();
    let chunks: Vec<&[u8]> = data.chunks(1).collect();
    let rows = parse_chunks(chunks);
    assert_eq!(rows, vec![vec!["ʤ", "→"], vec!["😀", "x"]]);

    let rows = parse_chunks(vec![&data[..1], &data[1..5], &data[5..]]);
    assert_eq!(rows, vec![vec!["ʤ", "→"], vec!["😀", "x"]]);
}

#[test]
fn test_chunks_positions() {
    let rows = parse_chunks(vec![&b"ab,c\r"[..], &b"\nd\ne"[..]]);
    let lines: Vec<(u64, u64)> = rows
        .iter()
        .map(|row| {
            let pos = row.position().unwrap();
            (pos.line(), pos.byte())
        })
        .collect();
    assert_eq!(lines, vec![(0, 0), (1, 6), (2, 8)]);
}
