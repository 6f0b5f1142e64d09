//! NetLength - HyperLynx board trace-length analysis library
//!
//! This library loads HyperLynx (`.hyp`) board descriptions and measures the
//! routed copper length between every pair of connected pads, net by net.
//!
//! # Quick Start
//!
//! ```no_run
//! use netlength::{AnalysisOptions, NetLengthCore};
//! use std::path::Path;
//!
//! let options = AnalysisOptions::from_pattern_list("DDR_.*,USB.*", true);
//! let report = NetLengthCore::analyze(Path::new("board.hyp"), options).unwrap();
//!
//! for path in &report.paths {
//!     println!("{}: {:.2} mil", path.display_name, path.total_length);
//! }
//! ```
//!
//! # Features
//!
//! - **Board parsing**: stackup, pad stacks, tracks, arcs, vias and pins
//! - **Net selection**: regex patterns, non-matching nets are never built
//! - **Pad-to-pad tracing**: depth-first walk over overlapping copper
//! - **Via length**: optional layer-transition height through vias and pads

pub mod board;
pub mod core;
pub mod geometry;
pub mod parser;
pub mod tracer;

// Re-export main types
pub use board::{Board, BoardError, Net, RouteElement};
pub use crate::core::{
    discover_board_files, AnalysisOptions, AnalysisReport, AnalysisStats, NetLengthCore,
    NetLengthError,
};
pub use parser::{HypParseError, HypParser, NetFilter};
pub use tracer::{PathResult, TraceOptions, TraceOutcome, Tracer};

/// Load every net of a board file (convenience wrapper).
pub fn load_board(path: &std::path::Path) -> Result<Board, NetLengthError> {
    Ok(HypParser::parse_file(path, &NetFilter::all())?)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AnalysisOptions, AnalysisReport, AnalysisStats, NetLengthCore, NetLengthError,
        PathResult, TraceOptions, Tracer,
    };
}
