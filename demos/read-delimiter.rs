// To run this example:
//
//   $ cargo run --example read-delimiter ';' data.csv
//
// Every line is printed along with the position it was read from.
use std::env;
use std::error::Error;
use std::ffi::OsString;
use std::process;

use dsv::{Configuration, Parser};

fn example() -> Result<(), Box<dyn Error>> {
    let (delimiter, file_path) = get_args()?;
    let config = Configuration::new(delimiter)?;
    let mut parser = Parser::from_path(config, &file_path)?;
    for result in parser.rows() {
        let row = result?;
        let line = row.position().map_or(0, |pos| pos.line());
        println!("{}: {:?}", line, row.iter().collect::<Vec<_>>());
    }
    Ok(())
}

fn get_args() -> Result<(char, OsString), Box<dyn Error>> {
    let mut args = env::args_os().skip(1);
    let delimiter = match args.next().and_then(|arg| arg.into_string().ok()) {
        None => return Err(From::from("expected a delimiter argument")),
        Some(delim) => {
            let mut chars = delim.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(From::from("delimiter must be one character")),
            }
        }
    };
    match args.next() {
        Some(file_path) => Ok((delimiter, file_path)),
        None => Err(From::from("expected 2 arguments, but got 1")),
    }
}

fn main() {
    if let Err(err) = example() {
        println!("error running example: {}", err);
        process::exit(1);
    }
}
