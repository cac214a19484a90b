use std::path::Path;

use rpgc_parser::strip_tracker_blocks;

pub fn run(input: &Path) -> Result<(), String> {
    let text = super::read_input(input)?;
    println!("{}", strip_tracker_blocks(&text));
    Ok(())
}
