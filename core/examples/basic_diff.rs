use sheetcmp::{diff_spreadsheets, open_spreadsheet_path, DiffConfig};

fn usage() -> ! {
    eprintln!("Usage: basic_diff <OLD.xlsx|ods> <NEW.xlsx|ods> [N]");
    eprintln!("  N: optionally print the first N events (debug)");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let old_path = args.next().unwrap_or_else(|| usage());
    let new_path = args.next().unwrap_or_else(|| usage());
    let show_n: Option<usize> = args.next().map(|s| s.parse()).transpose()?;

    let old = open_spreadsheet_path(&old_path)?;
    let new = open_spreadsheet_path(&new_path)?;

    let config = DiffConfig::builder()
        .source_a(&old_path)
        .source_b(&new_path)
        .build()?;
    let report = diff_spreadsheets(old.view.as_ref(), new.view.as_ref(), &config)?;

    println!("formats: {} vs {}", old.format, new.format);
    println!("differs: {}", report.differs);
    println!("events: {}", report.event_count());

    if let Some(n) = show_n {
        for (i, event) in report.events.iter().take(n).enumerate() {
            println!("{:>4}: {:?}", i, event);
        }
    }

    Ok(())
}
