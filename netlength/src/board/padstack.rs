//! Pad stack catalog: per-layer pad geometry keyed by pad stack name.

use indexmap::IndexMap;
use serde::Serialize;

use super::stackup::LayerStack;
use super::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PadShape {
    Normal,
    Rectangular,
    Oblong,
}

impl PadShape {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PadShape::Normal),
            1 => Some(PadShape::Rectangular),
            2 => Some(PadShape::Oblong),
            _ => None,
        }
    }
}

/// Pad geometry on one layer. Sizes are in mils, rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PadStackLayerDef {
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub shape: PadShape,
}

impl PadStackLayerDef {
    /// Radius of the node this pad contributes on its layer.
    pub fn node_radius(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PadStack {
    pub name: String,
    pub hole_size: f64,
    /// Layer name to pad geometry, in definition order.
    pub layers: IndexMap<String, PadStackLayerDef>,
}

impl PadStack {
    pub fn new(name: impl Into<String>, hole_size: f64) -> Self {
        Self {
            name: name.into(),
            hole_size,
            layers: IndexMap::new(),
        }
    }

    /// Explicit definition for `layer`; replaces any earlier one in place.
    pub fn set_layer(&mut self, layer: impl Into<String>, def: PadStackLayerDef) {
        self.layers.insert(layer.into(), def);
    }

    /// Apply `def` to every signal layer of `stackup` that has no entry yet.
    pub fn fill_signal_layers(&mut self, stackup: &LayerStack, def: PadStackLayerDef) {
        for layer in stackup.signal_layers() {
            if !self.layers.contains_key(&layer.name) {
                self.layers.insert(layer.name.clone(), def);
            }
        }
    }

    pub fn layer(&self, name: &str) -> Option<&PadStackLayerDef> {
        self.layers.get(name)
    }
}

/// All pad stacks of a board, by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PadStackCatalog {
    stacks: IndexMap<String, PadStack>,
}

impl PadStackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stack: PadStack) {
        self.stacks.insert(stack.name.clone(), stack);
    }

    pub fn get(&self, name: &str) -> Result<&PadStack, BoardError> {
        self.stacks
            .get(name)
            .ok_or_else(|| BoardError::UnknownPadStack(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PadStack> {
        self.stacks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::stackup::LayerKind;

    fn def(width: f64) -> PadStackLayerDef {
        PadStackLayerDef {
            width,
            height: width,
            rotation: 0.0,
            shape: PadShape::Normal,
        }
    }

    #[test]
    fn test_shape_codes() {
        assert_eq!(PadShape::from_code(0), Some(PadShape::Normal));
        assert_eq!(PadShape::from_code(1), Some(PadShape::Rectangular));
        assert_eq!(PadShape::from_code(2), Some(PadShape::Oblong));
        assert_eq!(PadShape::from_code(3), None);
    }

    #[test]
    fn test_fill_signal_layers_keeps_explicit_entries() {
        let mut stack = LayerStack::new();
        stack.add_layer("TOP", 1.4, LayerKind::Signal);
        stack.add_layer("D1", 4.0, LayerKind::Dielectric);
        stack.add_layer("GND", 1.4, LayerKind::Plane);
        stack.add_layer("BOTTOM", 1.4, LayerKind::Signal);

        let mut ps = PadStack::new("VIA", 8.0);
        ps.set_layer("BOTTOM", def(30.0));
        ps.fill_signal_layers(&stack, def(20.0));

        assert_eq!(ps.layers.len(), 2);
        assert_eq!(ps.layer("TOP").unwrap().width, 20.0);
        assert_eq!(ps.layer("BOTTOM").unwrap().width, 30.0);
        assert!(ps.layer("GND").is_none());
    }

    #[test]
    fn test_set_layer_overwrites_in_place() {
        let mut ps = PadStack::new("P", 0.0);
        ps.set_layer("TOP", def(10.0));
        ps.set_layer("BOTTOM", def(10.0));
        ps.set_layer("TOP", def(12.0));
        let names: Vec<_> = ps.layers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["TOP", "BOTTOM"]);
        assert_eq!(ps.layer("TOP").unwrap().width, 12.0);
    }

    #[test]
    fn test_node_radius_uses_smaller_side() {
        let d = PadStackLayerDef {
            width: 20.0,
            height: 50.0,
            rotation: 90.0,
            shape: PadShape::Oblong,
        };
        assert_eq!(d.node_radius(), 10.0);
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = PadStackCatalog::new();
        catalog.insert(PadStack::new("VIA", 8.0));
        assert!(catalog.get("VIA").is_ok());
        assert!(matches!(
            catalog.get("SMD"),
            Err(BoardError::UnknownPadStack(ref n)) if n == "SMD"
        ));
    }
}
