use std::path::Path;

use comfy_table::{ContentArrangement, Table};

use rpgc_core::TrackerSection;
use rpgc_parser::parse_response;

pub fn run(input: &Path, json: bool) -> Result<(), String> {
    let text = super::read_input(input)?;
    let snapshot = parse_response(&text);

    if json {
        let out = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    if snapshot.is_empty() {
        println!("  No tracker sections found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Section", "Content"]);

    let mut found = 0;
    for section in TrackerSection::ALL {
        if let Some(content) = snapshot.get(section) {
            table.add_row(vec![section.name(), content]);
            found += 1;
        }
    }

    println!("{table}");
    println!();
    println!("  {found} of {} sections found", TrackerSection::ALL.len());

    Ok(())
}
