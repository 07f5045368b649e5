use std::rc::Rc;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::fit::ViewportSize;

/// Measures the current size of the area the canvas is displayed in.
pub trait ViewportProvider {
    fn viewport_size(&self) -> ViewportSize;
}

/// Simple viewport that always reports the same resolution.
#[derive(Debug, Clone, Copy)]
pub struct StaticViewport {
    pub width: u32,
    pub height: u32,
}

impl StaticViewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ViewportProvider for StaticViewport {
    fn viewport_size(&self) -> ViewportSize {
        ViewportSize::from_pixels(self.width, self.height)
    }
}

/// Viewport fed by the windowing layer's resize events.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<(u32, u32)>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new((width.max(1), height.max(1))),
        }
    }

    pub fn update(&self, width: u32, height: u32) {
        *self.size.write() = (width.max(1), height.max(1));
    }

    pub fn width(&self) -> u32 {
        self.size.read().0
    }

    pub fn height(&self) -> u32 {
        self.size.read().1
    }
}

impl ViewportProvider for WindowViewport {
    fn viewport_size(&self) -> ViewportSize {
        let (width, height) = *self.size.read();
        ViewportSize::from_pixels(width, height)
    }
}

impl<T> ViewportProvider for Arc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> ViewportSize {
        (**self).viewport_size()
    }
}

impl<T> ViewportProvider for Rc<T>
where
    T: ViewportProvider + ?Sized,
{
    fn viewport_size(&self) -> ViewportSize {
        (**self).viewport_size()
    }
}
