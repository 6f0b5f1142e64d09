//! Trace a board file and print every pad-to-pad length.

use netlength::prelude::*;
use std::path::Path;

fn main() -> Result<(), NetLengthError> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .unwrap_or_else(|| "tests/fixtures/ddr_usb.hyp".to_string());
    let patterns = args.next().unwrap_or_else(|| ".*".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example trace_board [path/to/board.hyp] [NET_REGEX,...]");
        std::process::exit(1);
    }

    let options = AnalysisOptions::from_pattern_list(&patterns, true);
    let report = NetLengthCore::analyze(path, options)?;

    println!("Trace lengths for: {}", report.file.display());
    println!(
        "{} nets, {} objects, {} pads",
        report.stats.nets, report.stats.elements, report.stats.pads
    );
    println!();

    if report.is_empty() {
        println!("No connected paths found.");
        return Ok(());
    }

    for (name, length) in report.records() {
        println!("  {:<40} {:>10.2} mil", name, length);
    }
    Ok(())
}
