use log::debug;
use serde::{Deserialize, Serialize};

/// Smallest size any axis is allowed to take before a fit is computed.
const MIN_EXTENT: f32 = 1.0;

/// Authored canvas size and the guaranteed-visible area inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub max_width: f32,
    pub max_height: f32,
    pub safe_width: f32,
    pub safe_height: f32,
}

impl Dimensions {
    pub const fn new(max_width: f32, max_height: f32, safe_width: f32, safe_height: f32) -> Self {
        Self {
            max_width,
            max_height,
            safe_width,
            safe_height,
        }
    }

    /// Reconciles each axis so the larger value is max and the smaller is safe.
    ///
    /// Values are floored to one pixel first. Inverted pairs are swapped
    /// without reporting anything to the caller.
    pub fn normalized(self) -> Self {
        let (max_width, safe_width) = reconcile(self.max_width, self.safe_width);
        let (max_height, safe_height) = reconcile(self.max_height, self.safe_height);
        let normalized = Self {
            max_width,
            max_height,
            safe_width,
            safe_height,
        };
        if normalized != self {
            debug!("normalized dimensions {self:?} -> {normalized:?}");
        }
        normalized
    }

    /// Returns a copy with the fields present in `patch` replaced.
    pub fn merged(self, patch: &DimensionsPatch) -> Self {
        Self {
            max_width: patch.max_width.unwrap_or(self.max_width),
            max_height: patch.max_height.unwrap_or(self.max_height),
            safe_width: patch.safe_width.unwrap_or(self.safe_width),
            safe_height: patch.safe_height.unwrap_or(self.safe_height),
        }
    }
}

fn reconcile(max: f32, safe: f32) -> (f32, f32) {
    let max = floor_extent(max);
    let safe = floor_extent(safe);
    (max.max(safe), max.min(safe))
}

/// NaN and infinite extents carry no usable size and land on the floor.
fn floor_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_EXTENT)
    } else {
        MIN_EXTENT
    }
}

/// Partial dimension update; `None` keeps the previously configured value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_height: Option<f32>,
}

impl DimensionsPatch {
    pub fn is_empty(&self) -> bool {
        self.max_width.is_none()
            && self.max_height.is_none()
            && self.safe_width.is_none()
            && self.safe_height.is_none()
    }
}

impl From<Dimensions> for DimensionsPatch {
    fn from(dimensions: Dimensions) -> Self {
        Self {
            max_width: Some(dimensions.max_width),
            max_height: Some(dimensions.max_height),
            safe_width: Some(dimensions.safe_width),
            safe_height: Some(dimensions.safe_height),
        }
    }
}

/// Measured size of the browser viewport or window, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    fn floored(self) -> Self {
        Self::new(floor_extent(self.width), floor_extent(self.height))
    }
}

/// Visible rectangle in unscaled canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ViewArea {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            left: x,
            right: x + width,
            top: y,
            bottom: y + height,
        }
    }
}

/// Output of a fit computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleResult {
    pub scale_ratio: f32,
    pub view_area: ViewArea,
}

/// How the scale ratio is chosen from the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMode {
    /// The whole max canvas fits inside the viewport.
    #[default]
    Contain,
    /// The safe area fits inside the viewport; max-canvas overflow is cropped.
    SafeArea,
}

impl FitMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "contain" => Some(Self::Contain),
            "safe" | "safe-area" => Some(Self::SafeArea),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Contain => "contain",
            Self::SafeArea => "safe",
        }
    }
}

/// Computes the scale ratio and visible area using [`FitMode::Contain`].
pub fn compute_fit(dimensions: &Dimensions, viewport: &ViewportSize) -> ScaleResult {
    compute_fit_with(dimensions, viewport, FitMode::Contain)
}

/// Computes the scale ratio and visible area for the given fit mode.
///
/// The visible area is centered on the canvas and always lies between the
/// safe size and the max size on each axis.
pub fn compute_fit_with(
    dimensions: &Dimensions,
    viewport: &ViewportSize,
    mode: FitMode,
) -> ScaleResult {
    let dims = dimensions.normalized();
    let viewport = viewport.floored();

    let contain = (viewport.width / dims.max_width).min(viewport.height / dims.max_height);
    let scale_ratio = match mode {
        FitMode::Contain => contain,
        FitMode::SafeArea => {
            let safe = (viewport.width / dims.safe_width).min(viewport.height / dims.safe_height);
            contain.max(safe)
        }
    };

    let visible_width = (viewport.width / scale_ratio).clamp(dims.safe_width, dims.max_width);
    let visible_height = (viewport.height / scale_ratio).clamp(dims.safe_height, dims.max_height);
    let x = (dims.max_width - visible_width) / 2.0;
    let y = (dims.max_height - visible_height) / 2.0;

    ScaleResult {
        scale_ratio,
        view_area: ViewArea::new(x, y, visible_width, visible_height),
    }
}
