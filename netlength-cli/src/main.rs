//! NetLength CLI - pad-to-pad trace lengths of HyperLynx boards from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use netlength::{AnalysisOptions, AnalysisReport, NetLengthCore};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "netlength")]
#[command(about = "HyperLynx pad-to-pad trace length calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace every selected net of a board file
    Trace {
        /// Path to .hyp file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Comma-separated net name regexes, e.g. "DDR_.*,USB.*"
        #[arg(value_name = "NETS")]
        nets: String,

        /// Include the stack height crossed by vias and pads
        #[arg(long)]
        count_vias: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Start CSV output with a commented File/Nets/Date/Via length block
        #[arg(long)]
        with_meta: bool,
    },

    /// Trace every .hyp file in a directory
    Project {
        /// Path to project directory
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Comma-separated net name regexes
        #[arg(value_name = "NETS", default_value = ".*")]
        nets: String,

        /// Include the stack height crossed by vias and pads
        #[arg(long)]
        count_vias: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Start CSV output with a commented File/Nets/Date/Via length block
        #[arg(long)]
        with_meta: bool,
    },

    /// List the nets a pattern list selects
    Nets {
        /// Path to .hyp file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Comma-separated net name regexes
        #[arg(value_name = "NETS", default_value = ".*")]
        nets: String,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    Human,
    /// JSON report
    Json,
    /// Name,Length rows for spreadsheet import
    Csv,
}

/// Which command produced the reports; fixes the CSV column set.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ReportKind {
    Board,
    Project,
}

/// Where and how a run's reports are written.
struct OutputTarget<'a> {
    format: OutputFormat,
    path: Option<&'a Path>,
    with_meta: bool,
}

#[derive(Debug, Serialize)]
struct LengthCsvRecord<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Length")]
    length: f64,
}

#[derive(Debug, Serialize)]
struct ProjectCsvRecord<'a> {
    #[serde(rename = "File")]
    file: String,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Length")]
    length: f64,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Trace {
            file,
            nets,
            count_vias,
            format,
            output,
            with_meta,
        } => handle_trace(
            &file,
            &nets,
            count_vias,
            OutputTarget {
                format,
                path: output.as_deref(),
                with_meta,
            },
        ),
        Commands::Project {
            dir,
            nets,
            count_vias,
            format,
            output,
            with_meta,
        } => handle_project(
            &dir,
            &nets,
            count_vias,
            OutputTarget {
                format,
                path: output.as_deref(),
                with_meta,
            },
        ),
        Commands::Nets { file, nets } => handle_nets(&file, &nets),
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn handle_trace(file: &Path, nets: &str, count_vias: bool, target: OutputTarget<'_>) -> i32 {
    let options = AnalysisOptions::from_pattern_list(nets, count_vias);
    debug!("Net patterns: {:?}", options.net_patterns);

    match NetLengthCore::analyze(file, options) {
        Ok(report) => match output_results(&[report], ReportKind::Board, nets, &target) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_project(dir: &Path, nets: &str, count_vias: bool, target: OutputTarget<'_>) -> i32 {
    let options = AnalysisOptions::from_pattern_list(nets, count_vias);

    match NetLengthCore::analyze_project(dir, options) {
        Ok(reports) => {
            if reports.is_empty() {
                eprintln!("No .hyp files found in {}", dir.display());
            }
            match output_results(&reports, ReportKind::Project, nets, &target) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_nets(file: &Path, nets: &str) -> i32 {
    let options = AnalysisOptions::from_pattern_list(nets, false);

    match NetLengthCore::load_board(file, &options) {
        Ok(board) => {
            if board.nets.is_empty() {
                println!("No nets match {}", nets);
                return 0;
            }
            println!("{:<32} {:>8} {:>6}", "Net", "Objects", "Pads");
            for net in board.nets.values() {
                println!("{:<32} {:>8} {:>6}", net.name, net.elements.len(), net.pads.len());
            }
            println!(
                "\n{} nets, {} objects, {} pads",
                board.nets.len(),
                board.element_count(),
                board.pad_count()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn output_results(
    reports: &[AnalysisReport],
    kind: ReportKind,
    nets: &str,
    target: &OutputTarget<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = open_output(target.path)?;
    match target.format {
        OutputFormat::Human => output_human(reports, &mut out)?,
        OutputFormat::Json => output_json(reports, &mut out)?,
        OutputFormat::Csv => {
            let meta = target.with_meta.then(|| run_metadata(reports, kind, nets));
            output_csv(reports, kind, meta.as_deref(), &mut out)?
        }
    }
    out.flush()?;
    Ok(())
}

fn output_human(reports: &[AnalysisReport], out: &mut dyn Write) -> io::Result<()> {
    for report in reports {
        writeln!(out, "\nFile: {}", report.file.display())?;
        writeln!(out, "{}", "─".repeat(60))?;

        if report.is_empty() {
            writeln!(out, "  No connected paths found")?;
            continue;
        }

        for (name, length) in report.records() {
            writeln!(out, "  {:<44} {:>10.3}", name, length)?;
        }

        writeln!(out, "\n  Summary:")?;
        writeln!(out, "    Nets:   {}", report.stats.nets)?;
        writeln!(out, "    Paths:  {}", report.stats.paths)?;
        writeln!(
            out,
            "    Vias:   {}",
            if report.count_via_length { "counted" } else { "ignored" }
        )?;
        writeln!(
            out,
            "    Time:   load {:.1} ms, trace {:.1} ms",
            report.stats.load_time_ms, report.stats.trace_time_ms
        )?;
    }
    Ok(())
}

fn output_json(reports: &[AnalysisReport], out: &mut dyn Write) -> serde_json::Result<()> {
    let output = serde_json::json!({
        "results": reports,
        "summary": {
            "total_files": reports.len(),
            "total_paths": reports.iter().map(|r| r.paths.len()).sum::<usize>(),
        }
    });
    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out).map_err(serde_json::Error::io)
}

/// `(label, value)` pairs describing the run, for the CSV preamble.
fn run_metadata(
    reports: &[AnalysisReport],
    kind: ReportKind,
    nets: &str,
) -> Vec<(&'static str, String)> {
    let mut meta = Vec::new();
    if kind == ReportKind::Board {
        if let Some(report) = reports.first() {
            meta.push(("File", report.file.display().to_string()));
        }
    } else {
        meta.push(("Files", reports.len().to_string()));
    }
    meta.push(("Nets", nets.to_string()));
    let date = reports
        .first()
        .map(|r| r.generated_at)
        .unwrap_or_else(chrono::Local::now);
    meta.push(("Date", date.format("%Y-%m-%d %H:%M:%S").to_string()));
    let via_length = reports.first().is_some_and(|r| r.count_via_length);
    meta.push(("Via length", via_length.to_string()));
    meta
}

fn output_csv(
    reports: &[AnalysisReport],
    kind: ReportKind,
    meta: Option<&[(&'static str, String)]>,
    out: &mut dyn Write,
) -> csv::Result<()> {
    if reports.iter().all(AnalysisReport::is_empty) {
        eprintln!("No connected paths found");
    }

    // Headers are written by hand so an empty run still gets them.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(out);

    for (label, value) in meta.unwrap_or_default() {
        writer.write_record([format!("# {}", label).as_str(), value.as_str()])?;
    }

    match kind {
        ReportKind::Board => {
            writer.write_record(["Name", "Length"])?;
            for report in reports {
                for (name, length) in report.records() {
                    writer.serialize(LengthCsvRecord { name, length })?;
                }
            }
        }
        ReportKind::Project => {
            writer.write_record(["File", "Name", "Length"])?;
            for report in reports {
                let file = report.file.display().to_string();
                for (name, length) in report.records() {
                    writer.serialize(ProjectCsvRecord {
                        file: file.clone(),
                        name,
                        length,
                    })?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}
