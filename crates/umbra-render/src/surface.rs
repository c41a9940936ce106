//! Drawable size tracking across window resizes and scale-factor changes.
//!
//! The window system reports physical pixels and a scale factor (device
//! pixel ratio). The renderer draws at physical resolution; the camera
//! aspect ratio comes from the same numbers.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn aspect_ratio(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Logical window size plus the scale factor that maps it to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    logical_width: f64,
    logical_height: f64,
    scale_factor: f64,
}

impl Viewport {
    pub fn new(logical_width: f64, logical_height: f64, scale_factor: f64) -> Self {
        Self {
            logical_width,
            logical_height,
            scale_factor,
        }
    }

    /// Builds a viewport from the physical size the window system reports.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        Self::new(
            f64::from(width) / scale_factor,
            f64::from(height) / scale_factor,
            scale_factor,
        )
    }

    /// Logical size times scale factor, clamped to at least 1×1.
    pub fn physical_size(&self) -> PhysicalSize {
        let scale = |logical: f64| {
            ((logical * self.scale_factor).round() as u32).max(MIN_SURFACE_DIMENSION)
        };
        PhysicalSize {
            width: scale(self.logical_width),
            height: scale(self.logical_height),
        }
    }

    pub fn logical_width(&self) -> f64 {
        self.logical_width
    }

    pub fn logical_height(&self) -> f64 {
        self.logical_height
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Width over height of the logical size; 1.0 while either side is zero.
    pub fn aspect_ratio(&self) -> f32 {
        if self.logical_width > 0.0 && self.logical_height > 0.0 {
            (self.logical_width / self.logical_height) as f32
        } else {
            1.0
        }
    }

    /// Whether the window currently has a drawable area.
    pub fn is_visible(&self) -> bool {
        self.logical_width > 0.0 && self.logical_height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_size_applies_scale_factor() {
        let viewport = Viewport::new(500.0, 500.0, 2.0);
        assert_eq!(
            viewport.physical_size(),
            PhysicalSize {
                width: 1000,
                height: 1000
            }
        );
        assert_eq!(viewport.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_from_physical_recovers_logical_size() {
        let viewport = Viewport::from_physical(2880, 1800, 2.0);
        assert!((viewport.logical_width() - 1440.0).abs() < 1e-9);
        assert!((viewport.logical_height() - 900.0).abs() < 1e-9);
        assert_eq!(viewport.physical_size().width, 2880);
    }

    #[test]
    fn test_fractional_scale_rounds() {
        let viewport = Viewport::new(801.0, 601.0, 1.5);
        let size = viewport.physical_size();
        assert_eq!(size.width, 1202);
        assert_eq!(size.height, 902);
    }

    #[test]
    fn test_zero_size_clamped_to_one() {
        let viewport = Viewport::new(0.0, 0.0, 1.0);
        assert_eq!(viewport.physical_size(), PhysicalSize { width: 1, height: 1 });
        assert_eq!(viewport.aspect_ratio(), 1.0);
        assert!(!viewport.is_visible());
    }

    #[test]
    fn test_aspect_ratio_after_resize() {
        let viewport = Viewport::new(800.0, 600.0, 1.0);
        assert!((viewport.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
        assert!((viewport.physical_size().aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
    }
}
