//! Drawing-surface dimensions.
//!
//! Client size is in logical pixels. The render target is the client size
//! scaled by the device pixel ratio, clamped so high-DPI screens never
//! render more than 2x.

use winit::dpi::PhysicalSize;

pub const MAX_PIXEL_RATIO: f64 = 2.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub client_width: f64,
    pub client_height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(client_width: f64, client_height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            client_width,
            client_height,
            device_pixel_ratio,
        }
    }

    /// Builds a viewport from a window's physical size and scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    pub fn aspect(&self) -> f32 {
        (self.client_width / self.client_height) as f32
    }

    /// Zero-area viewports (minimized windows) cannot be rendered into.
    pub fn is_empty(&self) -> bool {
        self.client_width <= 0.0 || self.client_height <= 0.0
    }

    /// Render target size in pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            ((self.client_width * ratio).floor() as u32).max(1),
            ((self.client_height * ratio).floor() as u32).max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_clamped() {
        assert_eq!(Viewport::new(800.0, 600.0, 3.0).pixel_ratio(), 2.0);
        assert_eq!(Viewport::new(800.0, 600.0, 1.5).pixel_ratio(), 1.5);
    }

    #[test]
    fn test_from_physical_round_trips_client_size() {
        let viewport = Viewport::from_physical(PhysicalSize::new(1600, 1200), 2.0);
        assert_eq!(viewport.client_width, 800.0);
        assert_eq!(viewport.client_height, 600.0);
        assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));
    }

    #[test]
    fn test_empty_viewport() {
        assert!(Viewport::new(0.0, 600.0, 1.0).is_empty());
        assert!(!Viewport::new(1.0, 1.0, 1.0).is_empty());
    }
}
