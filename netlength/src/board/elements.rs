//! Copper objects of a net and the node-level intersection test.
//!
//! Every object is reduced to a set of circular nodes on named layers. Two
//! objects touch when a node of one overlaps a node of the other on a layer
//! both objects occupy.

use std::f64::consts::TAU;

use serde::Serialize;

use super::padstack::PadStack;
use super::stackup::LayerStack;
use super::BoardError;
use crate::geometry::{distance, Vec2};

/// Index of an element in its net's element list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub usize);

/// Addresses one node of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    pub element: ElementId,
    pub node: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteNode {
    pub position: Vec2,
    pub radius: f64,
    pub owner: ElementId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectResult {
    pub intersects: bool,
    /// Midpoint between the two node centres.
    pub location: Vec2,
    pub distance: f64,
    pub node_a: NodeRef,
    pub node_b: NodeRef,
    pub shared_layer: String,
}

impl RouteNode {
    /// Overlap test between two nodes: strictly closer than the sum of radii.
    pub fn intersect(&self, a: NodeRef, other: &RouteNode, b: NodeRef, layer: &str) -> IntersectResult {
        let dist = distance(self.position, other.position);
        IntersectResult {
            intersects: dist < self.radius + other.radius,
            location: self.position.midpoint(other.position),
            distance: dist,
            node_a: a,
            node_b: b,
            shared_layer: layer.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElementKind {
    Track {
        length: f64,
    },
    Arc {
        center: Vec2,
        radius: f64,
        length: f64,
    },
    Via {
        position: Vec2,
        padstack: String,
    },
    Pad {
        position: Vec2,
        padstack: String,
        name: String,
    },
}

/// Inputs the via/pad length depends on.
#[derive(Debug, Clone, Copy)]
pub struct LengthContext<'a> {
    pub stackup: &'a LayerStack,
    pub count_via_length: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteElement {
    pub id: ElementId,
    pub net: String,
    pub layers: Vec<String>,
    pub nodes: Vec<RouteNode>,
    pub kind: ElementKind,
}

impl RouteElement {
    /// Straight segment of width `width` between `p1` and `p2`.
    pub fn track(id: ElementId, net: &str, p1: Vec2, p2: Vec2, width: f64, layer: &str) -> Self {
        let radius = width / 2.0;
        Self {
            id,
            net: net.to_string(),
            layers: vec![layer.to_string()],
            nodes: vec![
                RouteNode { position: p1, radius, owner: id },
                RouteNode { position: p2, radius, owner: id },
            ],
            kind: ElementKind::Track {
                length: distance(p1, p2),
            },
        }
    }

    /// Arc around `center` between `start` and `end`.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        id: ElementId,
        net: &str,
        center: Vec2,
        start: Vec2,
        end: Vec2,
        radius: f64,
        width: f64,
        layer: &str,
    ) -> Self {
        let node_radius = width / 2.0;
        Self {
            id,
            net: net.to_string(),
            layers: vec![layer.to_string()],
            nodes: vec![
                RouteNode { position: start, radius: node_radius, owner: id },
                RouteNode { position: end, radius: node_radius, owner: id },
            ],
            kind: ElementKind::Arc {
                center,
                radius,
                length: arc_sweep(center, start, end) * radius,
            },
        }
    }

    pub fn via(id: ElementId, net: &str, position: Vec2, padstack: &PadStack) -> Self {
        let (layers, nodes) = stack_nodes(id, position, padstack);
        Self {
            id,
            net: net.to_string(),
            layers,
            nodes,
            kind: ElementKind::Via {
                position,
                padstack: padstack.name.clone(),
            },
        }
    }

    pub fn pad(id: ElementId, net: &str, position: Vec2, name: &str, padstack: &PadStack) -> Self {
        let (layers, nodes) = stack_nodes(id, position, padstack);
        Self {
            id,
            net: net.to_string(),
            layers,
            nodes,
            kind: ElementKind::Pad {
                position,
                padstack: padstack.name.clone(),
                name: name.to_string(),
            },
        }
    }

    pub fn is_pad(&self) -> bool {
        matches!(self.kind, ElementKind::Pad { .. })
    }

    /// Pin reference (`U1.A3`) when this element is a pad.
    pub fn pad_name(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Pad { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Track { .. } => "TRACK",
            ElementKind::Arc { .. } => "ARC",
            ElementKind::Via { .. } => "VIA",
            ElementKind::Pad { .. } => "PAD",
        }
    }

    /// Position of the first node; the drill position for vias and pads.
    pub fn origin(&self) -> Vec2 {
        match &self.kind {
            ElementKind::Via { position, .. } | ElementKind::Pad { position, .. } => *position,
            ElementKind::Track { .. } | ElementKind::Arc { .. } => self.nodes[0].position,
        }
    }

    /// Length contributed by passing through this element.
    ///
    /// Tracks and arcs always contribute their full length. Vias and pads
    /// contribute the stack height between `from` and `to` when via length
    /// counting is on.
    pub fn intrinsic_length(
        &self,
        ctx: &LengthContext<'_>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<f64, BoardError> {
        match &self.kind {
            ElementKind::Track { length } | ElementKind::Arc { length, .. } => Ok(*length),
            ElementKind::Via { .. } | ElementKind::Pad { .. } => {
                if ctx.count_via_length {
                    ctx.stackup.height(from, to)
                } else {
                    Ok(0.0)
                }
            }
        }
    }

    /// First layer of `self` that `other` also occupies.
    pub fn shared_layer<'a>(&'a self, other: &RouteElement) -> Option<&'a str> {
        self.layers
            .iter()
            .find(|l| other.layers.contains(l))
            .map(String::as_str)
    }

    /// All overlapping node pairs between `self` and `other`, closest first.
    pub fn intersect(&self, other: &RouteElement) -> Vec<IntersectResult> {
        let Some(layer) = self.shared_layer(other) else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        for (i, a) in self.nodes.iter().enumerate() {
            for (j, b) in other.nodes.iter().enumerate() {
                let r = a.intersect(
                    NodeRef { element: self.id, node: i },
                    b,
                    NodeRef { element: other.id, node: j },
                    layer,
                );
                if r.intersects {
                    hits.push(r);
                }
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn stack_nodes(id: ElementId, position: Vec2, padstack: &PadStack) -> (Vec<String>, Vec<RouteNode>) {
    padstack
        .layers
        .iter()
        .map(|(layer, def)| {
            (
                layer.clone(),
                RouteNode {
                    position,
                    radius: def.node_radius(),
                    owner: id,
                },
            )
        })
        .unzip()
}

/// Angle swept going from `end` back to `start` around `center`, in `[0, 2π)`.
fn arc_sweep(center: Vec2, start: Vec2, end: Vec2) -> f64 {
    let a_end = (end - center).angle();
    let a_start = (start - center).angle();
    if a_start < a_end {
        TAU - a_end + a_start
    } else {
        a_start - a_end
    }
}
