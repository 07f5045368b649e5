use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::fit::ViewArea;

/// Edge of the view area an anchor follows on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub enum AnchorEdge {
    /// Left or top edge (`-1`).
    #[default]
    Near,
    /// Middle of the axis (`0`).
    Center,
    /// Right or bottom edge (`1`).
    Far,
}

impl AnchorEdge {
    /// Picks the edge from the sign of `value`; magnitude is ignored.
    pub fn from_sign(value: f32) -> Self {
        if value < 0.0 {
            Self::Near
        } else if value > 0.0 {
            Self::Far
        } else {
            Self::Center
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Self::Near => -1.0,
            Self::Center => 0.0,
            Self::Far => 1.0,
        }
    }

    fn project(self, near: f32, far: f32, offset: f32) -> f32 {
        match self {
            Self::Near => near + offset,
            Self::Center => (near + far) / 2.0 + offset,
            Self::Far => far - offset,
        }
    }
}

impl From<f32> for AnchorEdge {
    fn from(value: f32) -> Self {
        Self::from_sign(value)
    }
}

impl From<AnchorEdge> for f32 {
    fn from(edge: AnchorEdge) -> Self {
        edge.sign()
    }
}

/// Edge selection for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AnchorDirection {
    pub x: AnchorEdge,
    pub y: AnchorEdge,
}

impl AnchorDirection {
    pub const TOP_LEFT: Self = Self::new(AnchorEdge::Near, AnchorEdge::Near);
    pub const CENTER: Self = Self::new(AnchorEdge::Center, AnchorEdge::Center);
    pub const BOTTOM_RIGHT: Self = Self::new(AnchorEdge::Far, AnchorEdge::Far);

    pub const fn new(x: AnchorEdge, y: AnchorEdge) -> Self {
        Self { x, y }
    }

    pub fn from_signs(x: f32, y: f32) -> Self {
        Self::new(AnchorEdge::from_sign(x), AnchorEdge::from_sign(y))
    }
}

/// UI position expressed relative to an edge, corner, or center of the view area.
///
/// `position` is an inset from the selected edge: added on near edges and the
/// center, subtracted on far edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub position: Vec2,
    pub direction: AnchorDirection,
}

impl Anchor {
    pub const fn new(position: Vec2, direction: AnchorDirection) -> Self {
        Self {
            position,
            direction,
        }
    }

    /// Projects the anchor onto `area`, returning canvas coordinates.
    pub fn project(&self, area: &ViewArea) -> Vec2 {
        Vec2::new(
            self.direction
                .x
                .project(area.left, area.right, self.position.x),
            self.direction
                .y
                .project(area.top, area.bottom, self.position.y),
        )
    }

    /// Returns a copy with the leaves present in `patch` replaced.
    pub fn merged(&self, patch: &AnchorPatch) -> Self {
        Self {
            position: Vec2::new(
                patch.position.x.unwrap_or(self.position.x),
                patch.position.y.unwrap_or(self.position.y),
            ),
            direction: AnchorDirection::new(
                patch.direction.x.unwrap_or(self.direction.x),
                patch.direction.y.unwrap_or(self.direction.y),
            ),
        }
    }
}

/// Per-axis optional pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisPatch<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<T>,
}

/// Partial anchor update; missing leaves keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorPatch {
    #[serde(default)]
    pub position: AxisPatch<f32>,
    #[serde(default)]
    pub direction: AxisPatch<AnchorEdge>,
}

impl AnchorPatch {
    pub fn is_empty(&self) -> bool {
        self.position.x.is_none()
            && self.position.y.is_none()
            && self.direction.x.is_none()
            && self.direction.y.is_none()
    }
}
