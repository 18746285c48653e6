use sheetcmp::{diff_spreadsheets, open_spreadsheet_path, DiffConfig};

fn usage() -> ! {
    eprintln!("Usage: ignore_rules <OLD.xlsx|ods> <NEW.xlsx|ods> <RULE>...");
    eprintln!("  RULE: sheetName:rowSpec:colSpec:cellSpec, applied to both sides");
    eprintln!("  e.g. 'Data:1,3-5' ignores rows 1 and 3-5 of sheet Data;");
    eprintln!("  'Data::B' ignores column B; a bare 'Data' ignores the sheet.");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let old_path = args.next().unwrap_or_else(|| usage());
    let new_path = args.next().unwrap_or_else(|| usage());
    let rules: Vec<String> = args.collect();
    if rules.is_empty() {
        usage();
    }

    let old = open_spreadsheet_path(&old_path)?;
    let new = open_spreadsheet_path(&new_path)?;

    let config = DiffConfig::builder()
        .source_a(&old_path)
        .source_b(&new_path)
        .ignore_a(rules.clone())
        .ignore_b(rules)
        .build()?;

    let report = diff_spreadsheets(old.view.as_ref(), new.view.as_ref(), &config)?;

    println!("differs: {}", report.differs);
    for (i, event) in report.events.iter().take(25).enumerate() {
        println!("{:>4}: {:?}", i, event);
    }

    Ok(())
}
