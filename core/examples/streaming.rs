use sheetcmp::{diff_spreadsheets_streaming, open_spreadsheet_path, DiffConfig, JsonLinesSink};

fn usage() -> ! {
    eprintln!("Usage: streaming <OLD.xlsx|ods> <NEW.xlsx|ods> > out.jsonl");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let old_path = args.next().unwrap_or_else(|| usage());
    let new_path = args.next().unwrap_or_else(|| usage());

    let old = open_spreadsheet_path(&old_path)?;
    let new = open_spreadsheet_path(&new_path)?;

    let config = DiffConfig::builder()
        .source_a(&old_path)
        .source_b(&new_path)
        .build()?;

    let stdout = std::io::stdout();
    let handle = stdout.lock();
    let mut sink = JsonLinesSink::new(handle, &old_path, &new_path);

    let summary =
        diff_spreadsheets_streaming(old.view.as_ref(), new.view.as_ref(), &config, &mut sink)?;

    eprintln!("differs={} events={}", summary.differs, summary.event_count);
    Ok(())
}
