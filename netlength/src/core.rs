//! Core analysis API shared by the CLI and library users.
//! Loads a board, traces it and packages the results with run metadata.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::board::{Board, BoardError};
use crate::parser::{HypParseError, HypParser, NetFilter};
use crate::tracer::{PathResult, TraceOptions, Tracer};

#[derive(Debug, thiserror::Error)]
pub enum NetLengthError {
    #[error("Parse error: {0}")]
    Parse(#[from] HypParseError),
    #[error("Board error: {0}")]
    Board(#[from] BoardError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for an analysis run.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisOptions {
    /// Net-name regexes; a net is loaded when any of them matches.
    pub net_patterns: Vec<String>,
    /// Include via/pad layer-transition height in path lengths.
    pub count_via_length: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            net_patterns: vec![".*".to_string()],
            count_via_length: false,
        }
    }
}

impl AnalysisOptions {
    /// Options from a comma separated pattern list such as `DDR_.*,USB.*`.
    pub fn from_pattern_list(list: &str, count_via_length: bool) -> Self {
        Self {
            net_patterns: list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            count_via_length,
        }
    }

    pub fn net_filter(&self) -> Result<NetFilter, HypParseError> {
        NetFilter::new(&self.net_patterns)
    }
}

/// Counts and timings of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub nets: usize,
    pub elements: usize,
    pub pads: usize,
    pub paths: usize,
    pub load_time_ms: f64,
    pub trace_time_ms: f64,
}

/// Paths found in one board file, with the metadata of the run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub file: PathBuf,
    pub net_patterns: Vec<String>,
    pub count_via_length: bool,
    pub paths: Vec<PathResult>,
    pub stats: AnalysisStats,
    pub generated_at: DateTime<Local>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// `(display_name, total_length)` records for spreadsheet-style sinks.
    pub fn records(&self) -> impl Iterator<Item = (&str, f64)> {
        self.paths
            .iter()
            .map(|p| (p.display_name.as_str(), p.total_length))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Recursively discover HyperLynx board files in a directory.
pub fn discover_board_files(dir: &Path) -> Result<Vec<PathBuf>, NetLengthError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), NetLengthError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "target" {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() {
            let is_hyp = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("hyp"));
            if is_hyp {
                files.push(path);
            }
        }
    }
    Ok(())
}

/// Core analysis API used by the CLI.
pub struct NetLengthCore;

impl NetLengthCore {
    /// Load only the nets selected by `options`.
    pub fn load_board(path: &Path, options: &AnalysisOptions) -> Result<Board, NetLengthError> {
        let filter = options.net_filter()?;
        Ok(HypParser::parse_file(path, &filter)?)
    }

    /// Load and trace a single board file.
    pub fn analyze(path: &Path, options: AnalysisOptions) -> Result<AnalysisReport, NetLengthError> {
        let started = Instant::now();
        let board = Self::load_board(path, &options)?;
        let load_time = started.elapsed();

        let tracer = Tracer::new(
            &board,
            TraceOptions {
                count_via_length: options.count_via_length,
            },
        );
        let outcome = tracer.trace_all()?;

        let stats = AnalysisStats {
            nets: board.nets.len(),
            elements: board.element_count(),
            pads: board.pad_count(),
            paths: outcome.paths.len(),
            load_time_ms: load_time.as_secs_f64() * 1000.0,
            trace_time_ms: outcome.elapsed.as_secs_f64() * 1000.0,
        };

        Ok(AnalysisReport {
            file: path.to_path_buf(),
            net_patterns: options.net_patterns,
            count_via_length: options.count_via_length,
            paths: outcome.paths,
            stats,
            generated_at: Local::now(),
        })
    }

    /// Analyze every `.hyp` file below `dir`. Stops at the first failure.
    pub fn analyze_project(
        dir: &Path,
        options: AnalysisOptions,
    ) -> Result<Vec<AnalysisReport>, NetLengthError> {
        discover_board_files(dir)?
            .iter()
            .map(|path| Self::analyze(path, options.clone()))
            .collect()
    }
}
