use sheetcmp::{diff_spreadsheets, open_spreadsheet_path, DiffConfig};

fn usage() -> ! {
    eprintln!("Usage: custom_config <OLD.xlsx|ods> <NEW.xlsx|ods>");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let old_path = args.next().unwrap_or_else(|| usage());
    let new_path = args.next().unwrap_or_else(|| usage());

    let old = open_spreadsheet_path(&old_path)?;
    let new = open_spreadsheet_path(&new_path)?;

    // Report every mismatched style attribute per cell instead of the
    // first one.
    let config = DiffConfig::builder()
        .source_a(&old_path)
        .source_b(&new_path)
        .all_style_mismatches(true)
        .build()?;

    let report = diff_spreadsheets(old.view.as_ref(), new.view.as_ref(), &config)?;

    println!("differs: {}", report.differs);
    println!("events: {}", report.event_count());
    Ok(())
}
