//! Safe-area scaling for game canvases displayed in resizable viewports.
//!
//! A canvas is authored at a maximum resolution and guarantees that a
//! smaller safe area is always visible. The crate computes the uniform scale
//! to apply to the canvas element, the rectangle of the canvas that is
//! currently visible, and the positions of UI anchors that track the edges of
//! that rectangle. Rendering and platform integration stay outside of the
//! crate so the computation remains testable in headless tools.

pub mod anchor;
pub mod config;
pub mod demo;
pub mod fit;
pub mod manager;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use anchor::{Anchor, AnchorDirection, AnchorEdge, AnchorPatch, AxisPatch};
pub use config::{DemoChanges, PayloadError, DEFAULT_DIMENSIONS};
pub use demo::{Demo, StageState};
pub use fit::{
    compute_fit, compute_fit_with, Dimensions, DimensionsPatch, FitMode, ScaleResult, ViewArea,
    ViewportSize,
};
pub use manager::{AnchorId, SafeScaleManager};
pub use viewport::{StaticViewport, ViewportProvider, WindowViewport};
