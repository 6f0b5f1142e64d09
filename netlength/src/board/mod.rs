//! Board data model: layer stack, pad stacks and the copper objects of
//! every loaded net.

pub mod elements;
pub mod padstack;
pub mod stackup;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

pub use elements::{
    ElementId, ElementKind, IntersectResult, LengthContext, NodeRef, RouteElement, RouteNode,
};
pub use padstack::{PadShape, PadStack, PadStackCatalog, PadStackLayerDef};
pub use stackup::{Layer, LayerKind, LayerStack};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoardError {
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),
    #[error("Unknown pad stack: {0}")]
    UnknownPadStack(String),
}

/// Copper objects of one net, in file order.
///
/// `elements` is the arena every [`ElementId`] of this net indexes into.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Net {
    pub name: String,
    pub elements: Vec<RouteElement>,
    /// Pads of the net, in file order.
    pub pads: Vec<ElementId>,
}

impl Net {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an element built for the next free id and return that id.
    pub fn push(&mut self, build: impl FnOnce(ElementId) -> RouteElement) -> ElementId {
        let id = ElementId(self.elements.len());
        let element = build(id);
        if element.is_pad() {
            self.pads.push(id);
        }
        self.elements.push(element);
        id
    }

    pub fn element(&self, id: ElementId) -> &RouteElement {
        &self.elements[id.0]
    }

    pub fn pads(&self) -> impl Iterator<Item = &RouteElement> {
        self.pads.iter().map(|id| self.element(*id))
    }
}

/// Everything loaded from one board description file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Board {
    pub stackup: LayerStack,
    pub padstacks: PadStackCatalog,
    /// Loaded nets in file order.
    pub nets: IndexMap<String, Net>,
}

impl Board {
    pub fn net(&self, name: &str) -> Option<&Net> {
        self.nets.get(name)
    }

    pub fn element_count(&self) -> usize {
        self.nets.values().map(|n| n.elements.len()).sum()
    }

    pub fn pad_count(&self) -> usize {
        self.nets.values().map(|n| n.pads.len()).sum()
    }
}
