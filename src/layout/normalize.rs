//! Bounding-box normalization of simulated positions into the output frame.
//!
//! The simulation works in an arbitrary unit space around `[0, 1)²`. Before a
//! layout is published every position is scaled per axis so the bounding box
//! spans the frame exactly: the minimum maps to 0 and the maximum to the
//! frame width (or height).

use serde::{Deserialize, Serialize};

use super::vector::Vector2;
use crate::error::{Axis, GraphError, Result};

/// Output frame configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameConfig {
    /// Frame width (default: 1024).
    pub width: f64,
    /// Frame height (default: 1024).
    pub height: f64,
    /// Smallest bounding-box extent used as a divisor. `None` (the default)
    /// reports a zero extent as [`GraphError::DegenerateLayout`].
    pub min_extent: Option<f64>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 1024.0,
            min_extent: None,
        }
    }
}

impl FrameConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GraphError::invalid(
                    name,
                    format!("frame dimension must be positive, got {value}"),
                ));
            }
        }
        if let Some(floor) = self.min_extent {
            if !(floor.is_finite() && floor > 0.0) {
                return Err(GraphError::invalid(
                    "minExtent",
                    format!("must be positive when set, got {floor}"),
                ));
            }
        }
        Ok(())
    }

    /// Center of the frame, where a lone node is placed.
    pub fn center(&self) -> [f64; 2] {
        [self.width / 2.0, self.height / 2.0]
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounding box of the given positions, or `None` when there are none.
    pub fn from_positions<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector2>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };

        Some(iter.fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Map `positions` into the frame.
///
/// No positions yields an empty result and a single position maps to the
/// frame center. Otherwise a zero extent on either axis is an error unless
/// `frame.min_extent` provides a floor.
pub fn normalize_positions(positions: &[Vector2], frame: &FrameConfig) -> Result<Vec<[f64; 2]>> {
    let Some(bounds) = Bounds::from_positions(positions.iter().copied()) else {
        return Ok(Vec::new());
    };
    if positions.len() == 1 {
        return Ok(vec![frame.center()]);
    }

    let x_scale = axis_scale(Axis::X, bounds.width(), frame.width, frame.min_extent)?;
    let y_scale = axis_scale(Axis::Y, bounds.height(), frame.height, frame.min_extent)?;

    Ok(positions
        .iter()
        .map(|p| {
            [
                ((p.x - bounds.min_x) * x_scale).clamp(0.0, frame.width),
                ((p.y - bounds.min_y) * y_scale).clamp(0.0, frame.height),
            ]
        })
        .collect())
}

fn axis_scale(axis: Axis, extent: f64, span: f64, min_extent: Option<f64>) -> Result<f64> {
    let extent = match min_extent {
        Some(floor) => extent.max(floor),
        None => extent,
    };
    if !(extent.is_finite() && extent > 0.0) {
        return Err(GraphError::DegenerateLayout { axis, extent });
    }
    Ok(span / extent)
}
