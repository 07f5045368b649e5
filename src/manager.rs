use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use log::{debug, trace};

use crate::anchor::{Anchor, AnchorPatch};
use crate::fit::{
    compute_fit_with, Dimensions, DimensionsPatch, FitMode, ScaleResult, ViewportSize,
};
use crate::viewport::ViewportProvider;

/// Receives every recomputed fit; hosts apply `scale_ratio` to the canvas element.
pub type ScaleCallback = Box<dyn FnMut(&ScaleResult)>;

/// Receives the projected canvas position of one anchor.
pub type AnchorCallback = Box<dyn FnMut(Vec2)>;

/// Handle returned when an anchor is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnchorId(u64);

impl AnchorId {
    pub fn value(self) -> u64 {
        self.0
    }

    #[cfg(target_arch = "wasm32")]
    pub(crate) fn from_value(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

struct Entity {
    anchor: Anchor,
    callback: AnchorCallback,
}

impl Entity {
    fn notify(&mut self, result: &ScaleResult) {
        (self.callback)(self.anchor.project(&result.view_area));
    }
}

/// Keeps a canvas and its anchored UI fitted to the current viewport.
///
/// Every recompute is synchronous: the scale callback fires once, then each
/// registered anchor callback fires once. Callbacks receive values only, so
/// the registry cannot change while a notification pass is running.
pub struct SafeScaleManager {
    dimensions: Dimensions,
    fit_mode: FitMode,
    viewport_provider: Box<dyn ViewportProvider>,
    viewport: ViewportSize,
    result: ScaleResult,
    on_scale: ScaleCallback,
    entities: BTreeMap<AnchorId, Entity>,
    next_id: u64,
}

impl SafeScaleManager {
    /// Creates a manager using [`FitMode::Contain`].
    ///
    /// The viewport is measured once; no callback fires until the first
    /// [`on_resize`](Self::on_resize) or [`configure`](Self::configure).
    pub fn new<P, F>(dimensions: Dimensions, viewport_provider: P, on_scale: F) -> Self
    where
        P: ViewportProvider + 'static,
        F: FnMut(&ScaleResult) + 'static,
    {
        Self::with_fit_mode(dimensions, FitMode::Contain, viewport_provider, on_scale)
    }

    pub fn with_fit_mode<P, F>(
        dimensions: Dimensions,
        fit_mode: FitMode,
        viewport_provider: P,
        on_scale: F,
    ) -> Self
    where
        P: ViewportProvider + 'static,
        F: FnMut(&ScaleResult) + 'static,
    {
        let dimensions = dimensions.normalized();
        let viewport = viewport_provider.viewport_size();
        let result = compute_fit_with(&dimensions, &viewport, fit_mode);
        Self {
            dimensions,
            fit_mode,
            viewport_provider: Box::new(viewport_provider),
            viewport,
            result,
            on_scale: Box::new(on_scale),
            entities: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    /// Viewport size measured by the last recompute.
    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Fit produced by the last recompute.
    pub fn result(&self) -> ScaleResult {
        self.result
    }

    pub fn anchor(&self, id: AnchorId) -> Option<Anchor> {
        self.entities.get(&id).map(|entity| entity.anchor)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Merges `patch` into the current dimensions, then recomputes and notifies.
    pub fn configure(&mut self, patch: DimensionsPatch) {
        self.dimensions = self.dimensions.merged(&patch).normalized();
        debug!("configured dimensions {:?}", self.dimensions);
        self.recompute();
    }

    pub fn set_fit_mode(&mut self, fit_mode: FitMode) {
        self.fit_mode = fit_mode;
        debug!("fit mode set to {fit_mode:?}");
        self.recompute();
    }

    /// Re-measures the viewport, recomputes the fit and notifies everyone.
    pub fn on_resize(&mut self) {
        self.recompute();
    }

    /// Registers an anchor and positions it against the current view area.
    pub fn add_entity<F>(&mut self, anchor: Anchor, callback: F) -> AnchorId
    where
        F: FnMut(Vec2) + 'static,
    {
        let id = AnchorId(self.next_id);
        self.next_id += 1;
        let mut entity = Entity {
            anchor,
            callback: Box::new(callback),
        };
        entity.notify(&self.result);
        self.entities.insert(id, entity);
        trace!("registered {id} ({} total)", self.entities.len());
        id
    }

    /// Unregisters an anchor, returning its last state.
    pub fn remove_entity(&mut self, id: AnchorId) -> Option<Anchor> {
        let removed = self.entities.remove(&id).map(|entity| entity.anchor);
        if removed.is_some() {
            trace!("removed {id} ({} remaining)", self.entities.len());
        }
        removed
    }

    /// Merges `patch` into a registered anchor and repositions it.
    pub fn update_entity(&mut self, id: AnchorId, patch: &AnchorPatch) -> Option<Anchor> {
        let entity = self.entities.get_mut(&id)?;
        entity.anchor = entity.anchor.merged(patch);
        entity.notify(&self.result);
        Some(entity.anchor)
    }

    fn recompute(&mut self) {
        self.viewport = self.viewport_provider.viewport_size();
        self.result = compute_fit_with(&self.dimensions, &self.viewport, self.fit_mode);
        trace!(
            "viewport {}x{} -> scale {:.4}, view area {:?}",
            self.viewport.width,
            self.viewport.height,
            self.result.scale_ratio,
            self.result.view_area
        );
        (self.on_scale)(&self.result);
        for entity in self.entities.values_mut() {
            entity.notify(&self.result);
        }
    }
}

impl fmt::Debug for SafeScaleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeScaleManager")
            .field("dimensions", &self.dimensions)
            .field("fit_mode", &self.fit_mode)
            .field("viewport", &self.viewport)
            .field("result", &self.result)
            .field("entities", &self.entities.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::anchor::{AnchorDirection, AxisPatch};
    use crate::fit::compute_fit;
    use crate::viewport::WindowViewport;

    const DEMO: Dimensions = Dimensions::new(1320.0, 780.0, 1024.0, 660.0);

    fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |value: T| sink.borrow_mut().push(value))
    }

    fn manager_with_window(
        fit_mode: FitMode,
    ) -> (SafeScaleManager, Rc<WindowViewport>, Rc<RefCell<Vec<f32>>>) {
        let window = Rc::new(WindowViewport::new(1280, 800));
        let ratios = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&ratios);
        let manager = SafeScaleManager::with_fit_mode(
            DEMO,
            fit_mode,
            Rc::clone(&window),
            move |result: &ScaleResult| sink.borrow_mut().push(result.scale_ratio),
        );
        (manager, window, ratios)
    }

    #[test]
    fn construction_does_not_notify() {
        let (manager, _window, ratios) = manager_with_window(FitMode::Contain);
        assert!(ratios.borrow().is_empty());
        assert!((manager.result().scale_ratio - 1280.0 / 1320.0).abs() < 1e-4);
    }

    #[test]
    fn add_entity_positions_immediately() {
        let (mut manager, _window, _ratios) = manager_with_window(FitMode::SafeArea);
        let (positions, sink) = recorder::<Vec2>();
        manager.add_entity(
            Anchor::new(Vec2::new(10.0, 10.0), AnchorDirection::TOP_LEFT),
            sink,
        );
        let positions = positions.borrow();
        assert_eq!(positions.len(), 1);
        assert!((positions[0] - Vec2::new(142.0, 70.0)).length() < 1e-3);
    }

    #[test]
    fn resize_notifies_scale_then_each_anchor_once() {
        let (mut manager, window, ratios) = manager_with_window(FitMode::SafeArea);
        let (first, first_sink) = recorder::<Vec2>();
        let (second, second_sink) = recorder::<Vec2>();
        manager.add_entity(Anchor::new(Vec2::ZERO, AnchorDirection::TOP_LEFT), first_sink);
        manager.add_entity(
            Anchor::new(Vec2::ZERO, AnchorDirection::BOTTOM_RIGHT),
            second_sink,
        );

        window.update(1320, 780);
        manager.on_resize();

        assert_eq!(ratios.borrow().len(), 1);
        assert_eq!(first.borrow().len(), 2);
        assert_eq!(second.borrow().len(), 2);
        // Max canvas fits exactly, so the safe ratio shows the safe area only.
        let ratio = ratios.borrow()[0];
        assert!((ratio - 780.0 / 660.0).abs() < 1e-4);
        assert_eq!(manager.viewport(), ViewportSize::new(1320.0, 780.0));
    }

    #[test]
    fn scale_callback_sees_the_result_being_published() {
        let window = Rc::new(WindowViewport::new(1280, 800));
        let latest = Rc::new(Cell::new(compute_fit(&DEMO, &window.viewport_size())));
        let sink = Rc::clone(&latest);
        let mut manager =
            SafeScaleManager::new(DEMO, Rc::clone(&window), move |result: &ScaleResult| {
                sink.set(*result)
            });
        assert_eq!(latest.get(), manager.result());

        window.update(660, 390);
        manager.on_resize();
        assert_eq!(latest.get(), manager.result());
        assert!((latest.get().scale_ratio - 0.5).abs() < 1e-4);
    }

    #[test]
    fn resize_with_empty_registry_only_scales() {
        let (mut manager, _window, ratios) = manager_with_window(FitMode::Contain);
        assert!(manager.is_empty());
        manager.on_resize();
        manager.on_resize();
        assert_eq!(ratios.borrow().len(), 2);
    }

    #[test]
    fn removed_entities_are_not_notified() {
        let (mut manager, _window, _ratios) = manager_with_window(FitMode::Contain);
        let (positions, sink) = recorder::<Vec2>();
        let anchor = Anchor::new(Vec2::new(4.0, 4.0), AnchorDirection::CENTER);
        let id = manager.add_entity(anchor, sink);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.remove_entity(id), Some(anchor));
        assert_eq!(manager.remove_entity(id), None);
        manager.on_resize();
        assert_eq!(positions.borrow().len(), 1);
        assert!(manager.anchor(id).is_none());
    }

    #[test]
    fn partial_configure_keeps_other_fields() {
        let (mut manager, _window, ratios) = manager_with_window(FitMode::Contain);
        manager.configure(DimensionsPatch {
            max_width: Some(1400.0),
            ..DimensionsPatch::default()
        });
        assert_eq!(
            manager.dimensions(),
            Dimensions::new(1400.0, 780.0, 1024.0, 660.0)
        );
        assert_eq!(ratios.borrow().len(), 1);
    }

    #[test]
    fn configure_normalizes_inverted_values() {
        let (mut manager, _window, _ratios) = manager_with_window(FitMode::Contain);
        manager.configure(DimensionsPatch {
            safe_width: Some(1500.0),
            ..DimensionsPatch::default()
        });
        assert_eq!(
            manager.dimensions(),
            Dimensions::new(1500.0, 780.0, 1320.0, 660.0)
        );
    }

    #[test]
    fn infinite_dimensions_still_scale_and_place_anchors() {
        let (mut manager, _window, ratios) = manager_with_window(FitMode::Contain);
        let (positions, sink) = recorder::<Vec2>();
        manager.add_entity(
            Anchor::new(Vec2::new(10.0, 10.0), AnchorDirection::BOTTOM_RIGHT),
            sink,
        );
        manager.configure(DimensionsPatch {
            max_width: Some(f32::INFINITY),
            ..DimensionsPatch::default()
        });
        let ratio = *ratios.borrow().last().unwrap();
        assert!(ratio.is_finite() && ratio > 0.0);
        let position = *positions.borrow().last().unwrap();
        assert!(position.x.is_finite() && position.y.is_finite());
    }

    #[test]
    fn update_entity_merges_and_repositions() {
        let (mut manager, _window, _ratios) = manager_with_window(FitMode::Contain);
        let (positions, sink) = recorder::<Vec2>();
        let id = manager.add_entity(
            Anchor::new(Vec2::new(10.0, 10.0), AnchorDirection::TOP_LEFT),
            sink,
        );
        let patch = AnchorPatch {
            position: AxisPatch {
                x: Some(30.0),
                y: None,
            },
            ..AnchorPatch::default()
        };
        let updated = manager.update_entity(id, &patch).unwrap();
        assert_eq!(updated.position, Vec2::new(30.0, 10.0));
        assert_eq!(positions.borrow().last().copied(), Some(Vec2::new(30.0, 10.0)));
        assert_eq!(manager.anchor(id), Some(updated));
    }

    #[test]
    fn switching_fit_mode_recomputes() {
        let (mut manager, _window, ratios) = manager_with_window(FitMode::Contain);
        manager.set_fit_mode(FitMode::SafeArea);
        assert_eq!(manager.fit_mode(), FitMode::SafeArea);
        assert_eq!(ratios.borrow().len(), 1);
        assert!((manager.result().view_area.width - 1056.0).abs() < 1e-3);
    }
}
