//! HyperLynx (`.hyp`) board description parser
//!
//! The file is a sequence of brace-delimited records:
//!
//! ```text
//! {STACKUP
//! (SIGNAL T=0.0014 L=TOP)
//! (DIELECTRIC T=0.004 C=4.3 L=D1)
//! }
//! {PADSTACK=VIA12,0.012
//! (MDEF,0,0.024,0.024,0)
//! }
//! {NET=DDR_DQ0
//! (SEG X1=1.0 Y1=1.0 X2=1.2 Y2=1.0 W=0.005 L=TOP)
//! (VIA X=1.2 Y=1.0 P=VIA12)
//! (PIN X=1.0 Y=1.0 R=U1.A3 P=BGA)
//! }
//! ```
//!
//! Only `STACKUP`, `PADSTACK` and `NET` records are read; every other record
//! is skipped. Lengths in the file are inches and are stored as mils.

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, trace};

use super::fields::{parse_line, parse_subsection, Fields};
use super::HypParseError;
use crate::board::{Board, LayerKind, Net, PadShape, PadStack, PadStackLayerDef, RouteElement};
use crate::geometry::Vec2;

/// File unit (inch) to mils.
pub const MILS_PER_UNIT: f64 = 1000.0;

/// Net-name patterns selecting which nets are loaded.
///
/// A net is loaded when any pattern matches anywhere in its name.
#[derive(Debug, Clone)]
pub struct NetFilter {
    patterns: Vec<Regex>,
    match_all: bool,
}

impl NetFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, HypParseError> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            match_all: false,
        })
    }

    /// Filter accepting every net.
    pub fn all() -> Self {
        Self {
            patterns: Vec::new(),
            match_all: true,
        }
    }

    pub fn matches(&self, net: &str) -> bool {
        self.match_all || self.patterns.iter().any(|p| p.is_match(net))
    }
}

/// One `{ ... }` record, braces stripped. Lines carry their 1-based number.
#[derive(Debug)]
struct Record<'a> {
    lines: Vec<(usize, &'a str)>,
}

impl<'a> Record<'a> {
    fn header(&self) -> (usize, &'a str) {
        self.lines[0]
    }

    fn body(&self) -> &[(usize, &'a str)] {
        &self.lines[1..]
    }

    /// Leading keyword of the header, e.g. `NET` for `NET=CLK`.
    fn keyword(&self) -> &'a str {
        let (_, header) = self.header();
        let end = header
            .find(|c: char| c == '=' || c == ',' || c.is_whitespace())
            .unwrap_or(header.len());
        &header[..end]
    }
}

/// Parser for HyperLynx board files
pub struct HypParser;

impl HypParser {
    /// Load a board file, keeping only the nets accepted by `filter`.
    pub fn parse_file(path: &Path, filter: &NetFilter) -> Result<Board, HypParseError> {
        let content = std::fs::read_to_string(path)?;
        info!("Loading board description {}", path.display());
        Self::parse_str(&content, filter)
    }

    /// Parse board description text.
    pub fn parse_str(content: &str, filter: &NetFilter) -> Result<Board, HypParseError> {
        let mut board = Board::default();

        for record in Self::split_records(content)? {
            let keyword = record.keyword();
            if keyword.eq_ignore_ascii_case("STACKUP") {
                Self::parse_stackup(&record, &mut board)?;
            } else if keyword.eq_ignore_ascii_case("PADSTACK") {
                Self::parse_padstack(&record, &mut board)?;
            } else if keyword.eq_ignore_ascii_case("NET") {
                Self::parse_net(&record, &mut board, filter)?;
            } else {
                trace!("Skipping {} record at line {}", keyword, record.header().0);
            }
        }

        info!(
            "Loaded {} layers, {} pad stacks, {} nets ({} objects, {} pads)",
            board.stackup.len(),
            board.padstacks.len(),
            board.nets.len(),
            board.element_count(),
            board.pad_count()
        );
        Ok(board)
    }

    fn split_records(content: &str) -> Result<Vec<Record<'_>>, HypParseError> {
        let mut records = Vec::new();
        let mut lines = content.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

        while let Some((start, line)) = lines.next() {
            if !line.starts_with('{') {
                continue;
            }

            let mut raw = vec![(start, line)];
            let mut last = line;
            while !last.ends_with('}') {
                let (n, next) = lines
                    .next()
                    .ok_or(HypParseError::UnterminatedBlock { line: start })?;
                raw.push((n, next));
                last = next;
            }

            let count = raw.len();
            let body: Vec<_> = raw
                .into_iter()
                .enumerate()
                .map(|(i, (n, l))| {
                    let l = if i == 0 { l.trim_start_matches('{') } else { l };
                    let l = if i + 1 == count { l.trim_end_matches('}') } else { l };
                    (n, l.trim())
                })
                .filter(|(_, l)| !l.is_empty())
                .collect();

            if !body.is_empty() {
                records.push(Record { lines: body });
            }
        }

        Ok(records)
    }

    fn parse_stackup(record: &Record<'_>, board: &mut Board) -> Result<(), HypParseError> {
        for &(line, text) in record.body() {
            let fields = Self::fields(line, text)?;
            if fields.has("OPTIONS") {
                continue;
            }

            let kind = if fields.has("SIGNAL") {
                LayerKind::Signal
            } else if fields.has("PLANE") {
                LayerKind::Plane
            } else if fields.has("DIELECTRIC") {
                LayerKind::Dielectric
            } else {
                return Err(HypParseError::UnknownLayerType {
                    line,
                    text: text.to_string(),
                });
            };

            let thickness = to_mils(line, Self::require(&fields, line, "T")?)?;
            let name = Self::require(&fields, line, "L")?;
            board.stackup.add_layer(name, thickness, kind);
        }

        debug!("Stackup with {} layers", board.stackup.len());
        Ok(())
    }

    fn parse_padstack(record: &Record<'_>, board: &mut Board) -> Result<(), HypParseError> {
        let (header_line, header) = record.header();
        let args = parse_line(header, ',');
        let name = Self::header_value(header_line, args[0])?;
        let hole_size = match args.get(1) {
            Some(hole) if !hole.trim().is_empty() => to_mils(header_line, hole)?,
            _ => 0.0,
        };

        let mut stack = PadStack::new(name, hole_size);

        for &(line, text) in record.body() {
            let args = parse_line(text, ',');
            if args.len() < 5 {
                return Err(HypParseError::Syntax {
                    line,
                    message: format!("expected at least 5 pad stack fields in '{}'", text),
                });
            }

            let code = to_number(line, args[1])?;
            let shape = PadShape::from_code(code as i64).ok_or_else(|| HypParseError::Syntax {
                line,
                message: format!("unknown pad shape {}", args[1].trim()),
            })?;
            let def = PadStackLayerDef {
                width: to_mils(line, args[2])?,
                height: to_mils(line, args[3])?,
                rotation: to_number(line, args[4])?,
                shape,
            };

            match args[0].trim() {
                "MDEF" => stack.fill_signal_layers(&board.stackup, def),
                // Antipads only matter for plane clearance.
                "ADEF" => continue,
                layer => stack.set_layer(layer, def),
            }
        }

        if board.padstacks.get(&stack.name).is_ok() {
            return Err(HypParseError::Syntax {
                line: header_line,
                message: format!("pad stack {} defined twice", stack.name),
            });
        }
        debug!("Pad stack {} with {} layers", stack.name, stack.layers.len());
        board.padstacks.insert(stack);
        Ok(())
    }

    fn parse_net(record: &Record<'_>, board: &mut Board, filter: &NetFilter) -> Result<(), HypParseError> {
        let (header_line, header) = record.header();
        let args = parse_line(header, ',');
        let name = Self::header_value(header_line, args[0])?;

        if !filter.matches(name) {
            trace!("Net {} not selected", name);
            return Ok(());
        }
        if board.nets.contains_key(name) {
            return Err(HypParseError::Syntax {
                line: header_line,
                message: format!("net {} defined twice", name),
            });
        }

        let mut net = Net::new(name);

        for &(line, text) in record.body() {
            let f = Self::fields(line, text)?;
            let num = |key: &str| -> Result<f64, HypParseError> {
                to_mils(line, Self::require(&f, line, key)?)
            };
            let point = |kx: &str, ky: &str| -> Result<Vec2, HypParseError> {
                Ok(Vec2::new(num(kx)?, num(ky)?))
            };

            if f.has("SEG") {
                let (p1, p2, width) = (point("X1", "Y1")?, point("X2", "Y2")?, num("W")?);
                let layer = Self::require(&f, line, "L")?;
                net.push(|id| RouteElement::track(id, name, p1, p2, width, layer));
            } else if f.has("ARC") {
                let center = point("XC", "YC")?;
                let (start, end) = (point("X1", "Y1")?, point("X2", "Y2")?);
                let (radius, width) = (num("R")?, num("W")?);
                let layer = Self::require(&f, line, "L")?;
                net.push(|id| RouteElement::arc(id, name, center, start, end, radius, width, layer));
            } else if f.has("VIA") {
                let position = point("X", "Y")?;
                let stack = board
                    .padstacks
                    .get(Self::require(&f, line, "P")?)
                    .map_err(|source| HypParseError::Board { line, source })?;
                net.push(|id| RouteElement::via(id, name, position, stack));
            } else if f.has("PIN") {
                let position = point("X", "Y")?;
                let pin = Self::require(&f, line, "R")?;
                let stack = board
                    .padstacks
                    .get(Self::require(&f, line, "P")?)
                    .map_err(|source| HypParseError::Board { line, source })?;
                net.push(|id| RouteElement::pad(id, name, position, pin, stack));
            } else {
                return Err(HypParseError::UnknownObject {
                    line,
                    text: text.to_string(),
                });
            }
        }

        debug!(
            "Net {}: {} objects, {} pads",
            net.name,
            net.elements.len(),
            net.pads.len()
        );
        board.nets.insert(net.name.clone(), net);
        Ok(())
    }

    fn fields<'a>(line: usize, text: &'a str) -> Result<Fields<'a>, HypParseError> {
        parse_subsection(text, ' ').map_err(|field| HypParseError::DuplicateField {
            line,
            field: field.to_string(),
        })
    }

    fn require<'a>(fields: &Fields<'a>, line: usize, key: &str) -> Result<&'a str, HypParseError> {
        fields.get(key).ok_or_else(|| HypParseError::MissingField {
            line,
            field: key.to_string(),
        })
    }

    /// Value of a `KEY=VALUE` record header field.
    fn header_value(line: usize, field: &str) -> Result<&str, HypParseError> {
        field
            .split_once('=')
            .map(|(_, v)| v.trim())
            .ok_or_else(|| HypParseError::Syntax {
                line,
                message: format!("expected KEY=VALUE record header, found '{}'", field),
            })
    }
}

fn to_number(line: usize, value: &str) -> Result<f64, HypParseError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| HypParseError::InvalidNumber {
            line,
            value: value.trim().to_string(),
        })
}

fn to_mils(line: usize, value: &str) -> Result<f64, HypParseError> {
    Ok(to_number(line, value)? * MILS_PER_UNIT)
}
