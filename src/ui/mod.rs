//! Presentation layer: the `--check` summary table and plain success/
//! failure lines. Suppressed by `--silent`, expanded by `--verbose`
//! through the `progress` submodule.

use bytesize::ByteSize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::types::{Codec, ExtractedMetadata, OperationMode};

pub mod progress;
pub mod prompt;

pub fn show_check_summary(codec: Codec, entries: &[ExtractedMetadata]) {
    if entries.is_empty() {
        println!("{}", console::style("No hidden files found").yellow().bright());
        return;
    }

    println!();
    println!(
        "{} {}",
        console::style("✔").green().bright(),
        console::style(format!("{codec} cover, {} hidden file(s):", entries.len())).white().bright()
    );
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("No").fg(Color::White),
            Cell::new("Name").fg(Color::White),
            Cell::new("Size").fg(Color::White),
        ]);

    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.file_name).fg(Color::Green),
            Cell::new(ByteSize(entry.file_size).to_string()),
        ]);
    }

    println!("{table}");
    println!();
}

pub fn show_success(mode: OperationMode, path: &std::path::Path) {
    let filename = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_else(|| path.display().to_string().into());
    println!();
    println!(
        "{} {}",
        console::style("✔").green().bright(),
        console::style(format!("{} completed: {filename}", mode.label())).white().bright()
    );
}

pub fn show_error(message: &str) {
    eprintln!("{} {}", console::style("✘").red().bright(), console::style(message).red());
}
