//! Pad-to-pad connectivity tracing.
//!
//! Starting from every pad of every loaded net, the tracer walks depth-first
//! through overlapping copper objects and records each other pad it reaches
//! together with the accumulated length.
//!
//! Within one walk, an object is claimed by the first branch that discovers
//! it: every object touching the current one is marked visited before any of
//! them is descended into, and the visited set is shared by all branches of
//! the walk. Which pads are reported from a given start pad therefore depends
//! on file order, and the scan order below must stay exactly as it is.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::board::{Board, BoardError, ElementId, LengthContext, Net};
use crate::geometry::{distance, Vec2};

#[derive(Debug, Clone, Copy, Default)]
pub struct TraceOptions {
    /// Add the stack height crossed inside vias and pads.
    pub count_via_length: bool,
}

/// A pad reached from another pad of the same net.
///
/// Two results are equal when they join the same two pads, in either
/// direction. Length and net do not take part in the comparison.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub start_pad: String,
    pub end_pad: String,
    pub net: String,
    /// Mils.
    pub total_length: f64,
    /// `<net>-<start component>-<end component>`
    pub display_name: String,
}

impl PathResult {
    pub fn new(net: &str, start_pad: &str, end_pad: &str, total_length: f64) -> Self {
        Self {
            display_name: format!("{}-{}-{}", net, component_of(start_pad), component_of(end_pad)),
            start_pad: start_pad.to_string(),
            end_pad: end_pad.to_string(),
            net: net.to_string(),
            total_length,
        }
    }

    /// Endpoint names in a direction-independent order.
    pub fn endpoints(&self) -> (&str, &str) {
        if self.start_pad <= self.end_pad {
            (&self.start_pad, &self.end_pad)
        } else {
            (&self.end_pad, &self.start_pad)
        }
    }
}

impl PartialEq for PathResult {
    fn eq(&self, other: &Self) -> bool {
        self.endpoints() == other.endpoints()
    }
}

impl Eq for PathResult {}

impl Hash for PathResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.endpoints().hash(state);
    }
}

/// Reference designator part of a pin name (`U1` for `U1.A3`).
fn component_of(pad: &str) -> &str {
    pad.split('.').next().unwrap_or(pad)
}

/// Results of a full run, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceOutcome {
    pub paths: Vec<PathResult>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64() * 1000.0)
    }
}

/// Deduplicating, order-preserving result collection.
#[derive(Debug, Default)]
struct PathSet {
    seen: HashSet<PathResult>,
    paths: Vec<PathResult>,
}

impl PathSet {
    fn insert(&mut self, path: PathResult) -> bool {
        if self.seen.contains(&path) {
            return false;
        }
        self.seen.insert(path.clone());
        self.paths.push(path);
        true
    }
}

/// Pending descent into `element`.
struct Step {
    element: ElementId,
    length: f64,
    position: Vec2,
    layer: Option<String>,
}

pub struct Tracer<'a> {
    board: &'a Board,
    ctx: LengthContext<'a>,
}

impl<'a> Tracer<'a> {
    pub fn new(board: &'a Board, options: TraceOptions) -> Self {
        Self {
            board,
            ctx: LengthContext {
                stackup: &board.stackup,
                count_via_length: options.count_via_length,
            },
        }
    }

    /// Trace from every pad of every loaded net.
    pub fn trace_all(&self) -> Result<TraceOutcome, BoardError> {
        let started = Instant::now();
        let mut set = PathSet::default();

        for net in self.board.nets.values() {
            let before = set.paths.len();
            for &pad in &net.pads {
                self.trace_from(net, pad, &mut set)?;
            }
            debug!("Net {}: {} new paths", net.name, set.paths.len() - before);
        }

        let elapsed = started.elapsed();
        info!("Traced {} paths in {:?}", set.paths.len(), elapsed);
        Ok(TraceOutcome {
            paths: set.paths,
            elapsed,
        })
    }

    /// Trace the pads of a single net.
    pub fn trace_net(&self, net: &Net) -> Result<Vec<PathResult>, BoardError> {
        let mut set = PathSet::default();
        for &pad in &net.pads {
            self.trace_from(net, pad, &mut set)?;
        }
        Ok(set.paths)
    }

    /// One walk from pad `start`.
    ///
    /// Runs on an explicit stack; children are pushed in reverse discovery
    /// order so they are visited in the same order a recursive walk would.
    fn trace_from(&self, net: &Net, start: ElementId, set: &mut PathSet) -> Result<(), BoardError> {
        let start_el = net.element(start);
        let Some(start_name) = start_el.pad_name() else {
            return Ok(());
        };

        let mut visited = vec![false; net.elements.len()];
        visited[start.0] = true;

        let mut stack = vec![Step {
            element: start,
            length: 0.0,
            position: start_el.origin(),
            layer: None,
        }];

        while let Some(step) = stack.pop() {
            let obj = net.element(step.element);

            if step.element != start {
                if let Some(end_name) = obj.pad_name() {
                    let total = step.length + distance(step.position, obj.origin());
                    set.insert(PathResult::new(&net.name, start_name, end_name, total));
                    continue;
                }
            }

            // Claim every touching object before descending into any of them.
            let mut hits = Vec::new();
            for candidate in &net.elements {
                if candidate.id == obj.id || visited[candidate.id.0] {
                    continue;
                }
                if let Some(hit) = obj.intersect(candidate).into_iter().next() {
                    visited[candidate.id.0] = true;
                    hits.push(hit);
                }
            }

            let mut children = Vec::with_capacity(hits.len());
            for hit in hits {
                let through = obj.intrinsic_length(
                    &self.ctx,
                    step.layer.as_deref(),
                    Some(hit.shared_layer.as_str()),
                )?;
                let target = net.element(hit.node_b.element);
                children.push(Step {
                    element: target.id,
                    length: step.length + through + hit.distance,
                    position: target.nodes[hit.node_b.node].position,
                    layer: Some(hit.shared_layer),
                });
            }
            stack.extend(children.into_iter().rev());
        }

        Ok(())
    }
}
