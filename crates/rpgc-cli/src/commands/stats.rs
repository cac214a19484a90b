use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde_json::json;

use rpgc_core::{Meter, Quests, UserStats};
use rpgc_parser::{ParserConfig, parse_info_box, parse_present_characters, parse_response, parse_user_stats};

fn field_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table
}

pub fn run(input: &Path, json: bool) -> Result<(), String> {
    let text = super::read_input(input)?;
    let snapshot = parse_response(&text);
    let Some(stats_text) = snapshot.user_stats.as_deref() else {
        return Err("no Stats section found".into());
    };

    let config = ParserConfig::default();
    let mut stats = UserStats::default();
    let mut quests = Quests::default();
    parse_user_stats(stats_text, &mut stats, &mut quests, &config);
    let info = snapshot
        .info_box
        .as_deref()
        .map(|t| parse_info_box(t, &config));
    let characters = snapshot
        .character_thoughts
        .as_deref()
        .map(parse_present_characters)
        .unwrap_or_default();

    if json {
        let value = json!({
            "userStats": stats,
            "quests": quests,
            "infoBox": info,
            "characters": characters,
        });
        let out = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    let mut table = field_table();
    for meter in Meter::ALL {
        table.add_row(vec![meter.label().to_string(), format!("{}%", stats.meter(meter))]);
    }
    table.add_row(vec!["Mood".to_string(), stats.mood.clone()]);
    table.add_row(vec!["Conditions".to_string(), stats.conditions.clone()]);
    table.add_row(vec!["On Person".to_string(), stats.inventory.on_person.clone()]);
    for (location, items) in &stats.inventory.stored {
        table.add_row(vec![format!("Stored - {location}"), items.clone()]);
    }
    table.add_row(vec!["Assets".to_string(), stats.inventory.assets.clone()]);
    table.add_row(vec!["Main Quest".to_string(), quests.main.clone()]);
    if !quests.optional.is_empty() {
        table.add_row(vec!["Optional Quests".to_string(), quests.optional.join(", ")]);
    }
    println!("  {}", "Stats".bold());
    println!("{table}");

    if let Some(info) = info.filter(|i| !i.is_empty()) {
        let mut table = field_table();
        let weather = [info.weather_emoji.as_deref(), info.weather.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let rows = [
            ("Date", info.date),
            ("Weather", Some(weather).filter(|w| !w.is_empty())),
            ("Temperature", info.temperature),
            ("Time", info.time),
            ("Location", info.location),
            ("Recent Events", info.recent_events),
        ];
        for (label, value) in rows {
            if let Some(value) = value {
                table.add_row(vec![label.to_string(), value]);
            }
        }
        println!();
        println!("  {}", "Info Box".bold());
        println!("{table}");
    }

    if !characters.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Name", "Demeanor", "Relationship", "Thoughts"]);
        for c in &characters {
            table.add_row(vec![
                format!("{} {}", c.emoji, c.name),
                c.demeanor.clone(),
                c.relationship.clone(),
                c.thoughts.clone(),
            ]);
        }
        println!();
        println!("  {}", "Present Characters".bold());
        println!("{table}");
    }

    Ok(())
}
