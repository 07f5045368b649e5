//! Host-container configuration payloads.
//!
//! The container sends partial JSON objects such as
//! `{"maxWidth": 1280, "position": {"x": 12}}`. Every leaf is looked up by
//! dotted path and falls back to the previously known value when any segment
//! of the path is missing, `null`, or not a number.

use serde_json::Value;
use thiserror::Error;

use crate::anchor::{Anchor, AnchorEdge, AnchorPatch, AxisPatch};
use crate::fit::{Dimensions, DimensionsPatch};

/// Resolutions the demo starts with.
pub const DEFAULT_DIMENSIONS: Dimensions = Dimensions::new(1320.0, 780.0, 1024.0, 660.0);

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Walks `path` through nested objects, stopping at the first missing or
/// `null` segment.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| {
        match current.as_object()?.get(segment)? {
            Value::Null => None,
            next => Some(next),
        }
    })
}

/// Reads a number at `path`, substituting `default` when it cannot be found.
pub fn number_or(value: &Value, path: &str, default: f32) -> f32 {
    number_at(value, path).unwrap_or(default)
}

/// Numbers outside the `f32` range count as missing.
fn number_at(value: &Value, path: &str) -> Option<f32> {
    lookup(value, path)
        .and_then(Value::as_f64)
        .map(|number| number as f32)
        .filter(|number| number.is_finite())
}

/// A change request from the host container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DemoChanges {
    payload: Value,
}

impl DemoChanges {
    pub fn new(payload: Value) -> Result<Self, PayloadError> {
        match payload {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => Ok(Self { payload }),
            other => Err(PayloadError::NotAnObject(kind_name(&other))),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, PayloadError> {
        Self::new(serde_json::from_str(text)?)
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Resolves the payload against the current dimensions; every field is
    /// present in the returned patch.
    pub fn dimensions(&self, current: &Dimensions) -> DimensionsPatch {
        DimensionsPatch {
            max_width: Some(number_or(&self.payload, "maxWidth", current.max_width)),
            max_height: Some(number_or(&self.payload, "maxHeight", current.max_height)),
            safe_width: Some(number_or(&self.payload, "safeWidth", current.safe_width)),
            safe_height: Some(number_or(&self.payload, "safeHeight", current.safe_height)),
        }
    }

    /// Collects the anchor leaves the payload actually carries.
    pub fn anchor_patch(&self) -> AnchorPatch {
        AnchorPatch {
            position: AxisPatch {
                x: number_at(&self.payload, "position.x"),
                y: number_at(&self.payload, "position.y"),
            },
            direction: AxisPatch {
                x: number_at(&self.payload, "direction.x").map(AnchorEdge::from_sign),
                y: number_at(&self.payload, "direction.y").map(AnchorEdge::from_sign),
            },
        }
    }

    /// Resolves the anchor fields against `current`, leaf by leaf.
    pub fn anchor(&self, current: &Anchor) -> Anchor {
        current.merged(&self.anchor_patch())
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
