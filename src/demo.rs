use std::sync::Arc;

use glam::Vec2;
use log::info;
use parking_lot::RwLock;

use crate::anchor::{Anchor, AnchorDirection};
use crate::config::DemoChanges;
use crate::fit::{Dimensions, FitMode, ScaleResult};
use crate::manager::{AnchorId, SafeScaleManager};
use crate::viewport::ViewportProvider;

/// Inset of the resolution label from the top-left corner of the view area.
pub const LABEL_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// What the callbacks last told the page: canvas scale and label position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageState {
    pub scale_ratio: f32,
    pub label_position: Vec2,
}

/// Shared handle to the stage, written by the manager callbacks.
#[derive(Debug)]
pub struct Stage {
    state: Arc<RwLock<StageState>>,
}

impl Clone for Stage {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl Stage {
    fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StageState {
                scale_ratio: 1.0,
                label_position: LABEL_OFFSET,
            })),
        }
    }

    pub fn snapshot(&self) -> StageState {
        *self.state.read()
    }

    fn apply_scale(&self, result: &ScaleResult) {
        self.state.write().scale_ratio = result.scale_ratio;
    }

    fn move_label(&self, position: Vec2) {
        self.state.write().label_position = position;
    }
}

/// Headless stand-in for the browser demo page.
///
/// The manager and its collaborators are injected at construction; nothing
/// reaches for a shared global instance.
#[derive(Debug)]
pub struct Demo {
    manager: SafeScaleManager,
    stage: Stage,
    label: AnchorId,
}

impl Demo {
    pub fn new<P>(resolutions: Dimensions, fit_mode: FitMode, viewport: P) -> Self
    where
        P: ViewportProvider + 'static,
    {
        let stage = Stage::new();
        let scale_stage = stage.clone();
        let mut manager =
            SafeScaleManager::with_fit_mode(resolutions, fit_mode, viewport, move |result| {
                scale_stage.apply_scale(result)
            });
        let label_stage = stage.clone();
        let label = manager.add_entity(
            Anchor::new(LABEL_OFFSET, AnchorDirection::TOP_LEFT),
            move |position| label_stage.move_label(position),
        );
        manager.on_resize();
        Self {
            manager,
            stage,
            label,
        }
    }

    pub fn manager(&self) -> &SafeScaleManager {
        &self.manager
    }

    pub fn stage(&self) -> StageState {
        self.stage.snapshot()
    }

    /// Size of the canvas element: the max resolution times the last scale ratio.
    pub fn canvas_size(&self) -> Vec2 {
        let resolutions = self.manager.dimensions();
        let ratio = self.stage.snapshot().scale_ratio;
        Vec2::new(resolutions.max_width, resolutions.max_height) * ratio
    }

    pub fn label_anchor(&self) -> Option<Anchor> {
        self.manager.anchor(self.label)
    }

    /// Forwards a resize notification from the environment.
    pub fn on_resize(&mut self) {
        self.manager.on_resize();
    }

    /// Applies a host change request to the resolutions and the label anchor.
    pub fn apply_changes(&mut self, changes: &DemoChanges) {
        let patch = changes.dimensions(&self.manager.dimensions());
        self.manager.configure(patch);
        let resolutions = self.manager.dimensions();
        info!(
            "applied resolutions max={}x{} safe={}x{}",
            resolutions.max_width,
            resolutions.max_height,
            resolutions.safe_width,
            resolutions.safe_height
        );

        let patch = changes.anchor_patch();
        if !patch.is_empty() {
            self.manager.update_entity(self.label, &patch);
        }
    }

    /// Text shown in the resolution label.
    pub fn resolution_text(&self) -> String {
        let resolutions = self.manager.dimensions();
        let viewport = self.manager.viewport();
        format!(
            "Game Width: {}\nGame Height: {}\n\nSafe Width: {}\nSafe Height: {}\n\nWindow Width: {}\nWindow Height: {}\n",
            resolutions.max_width,
            resolutions.max_height,
            resolutions.safe_width,
            resolutions.safe_height,
            viewport.width,
            viewport.height
        )
    }

    /// One-line summary of the current fit.
    pub fn report(&self) -> String {
        let viewport = self.manager.viewport();
        let result = self.manager.result();
        let area = result.view_area;
        let canvas = self.canvas_size();
        let label = self.stage.snapshot().label_position;
        format!(
            "viewport {}x{} scale={:.4} canvas={:.2}x{:.2} view=({:.2}, {:.2}, {:.2}, {:.2}) label=({:.2}, {:.2})",
            viewport.width,
            viewport.height,
            result.scale_ratio,
            canvas.x,
            canvas.y,
            area.left,
            area.top,
            area.right,
            area.bottom,
            label.x,
            label.y
        )
    }
}
