//! Physical layer stack of the board.

use serde::Serialize;

use super::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayerKind {
    Signal,
    Plane,
    Dielectric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    /// Thickness in mils.
    pub thickness: f64,
    pub kind: LayerKind,
    /// Position in the stack, assigned on insertion.
    pub index: usize,
}

/// Layers ordered top to bottom, in the order they were added.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer below the current bottom and return its index.
    pub fn add_layer(&mut self, name: impl Into<String>, thickness: f64, kind: LayerKind) -> usize {
        let index = self.layers.len();
        self.layers.push(Layer {
            name: name.into(),
            thickness,
            kind,
            index,
        });
        index
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn signal_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.kind == LayerKind::Signal)
    }

    fn index_of(&self, name: &str) -> Result<usize, BoardError> {
        self.layer(name)
            .map(|l| l.index)
            .ok_or_else(|| BoardError::UnknownLayer(name.to_string()))
    }

    /// Height travelled when moving from `from` to `to`.
    ///
    /// Sums the thickness of every layer whose index lies in
    /// `[min(i_from, i_to), max(i_from, i_to))`. A missing name on either
    /// side means "no layer yet" and yields 0.
    pub fn height(&self, from: Option<&str>, to: Option<&str>) -> Result<f64, BoardError> {
        let (Some(from), Some(to)) = (from, to) else {
            return Ok(0.0);
        };
        if from == to {
            return Ok(0.0);
        }

        let a = self.index_of(from)?;
        let b = self.index_of(to)?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        Ok(self.layers[lo..hi].iter().map(|l| l.thickness).sum())
    }

    /// Smallest height between any layer of `from` and any layer of `to`.
    pub fn min_height<A, B>(&self, from: &[A], to: &[B]) -> Result<f64, BoardError>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut min = f64::MAX;
        for a in from {
            for b in to {
                let h = self.height(Some(a.as_ref()), Some(b.as_ref()))?;
                if h < min {
                    min = h;
                }
            }
        }
        Ok(min)
    }
}
