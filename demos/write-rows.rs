// To run this example:
//
//   $ cargo run --example write-rows
use std::error::Error;
use std::io;
use std::process;

use dsv::{Configuration, Writer};

fn example() -> Result<(), Box<dyn Error>> {
    let config = Configuration::new(';')?;
    let mut wtr = Writer::from_writer(config, io::stdout());

    wtr.write_line(&["city", "region", "note"])?;
    wtr.write_line(&["Southborough", "MA", "has a; in it"])?;
    wtr.write_line(&["Northbridge", "MA", "says \"hello\""])?;
    wtr.write_line(&["Westford", "MA", "spans\ntwo lines"])?;
    wtr.flush()?;
    // The writer never ends the last line.
    println!();
    Ok(())
}

fn main() {
    if let Err(err) = example() {
        println!("error running example: {}", err);
        process::exit(1);
    }
}
