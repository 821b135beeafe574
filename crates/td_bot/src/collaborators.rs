//! Interfaces to the outside world: screen capture, OCR and input injection.
//!
//! Platform backends implement these traits. Everything above them works in
//! normalized window coordinates and never touches the desktop directly.

use image::RgbImage;

use td_core::error::{BotError, Result};
use td_core::math::{NormPos, NormRect};
use td_core::vision::{PixelProbe, Rgb};

/// Window placement on the desktop, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Client width.
    pub width: u32,
    /// Client height.
    pub height: u32,
}

/// A position relative to the game window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenPos {
    /// Fraction of the window size.
    Normalized(NormPos),
    /// Pixels from the window's top-left corner.
    Pixel {
        /// Horizontal offset.
        x: i32,
        /// Vertical offset.
        y: i32,
    },
}

impl ScreenPos {
    /// Interpret a coordinate pair: both in `0..=1` means fractions,
    /// anything else means window pixels.
    #[must_use]
    pub fn from_coords(x: f64, y: f64) -> Self {
        let pos = NormPos::new(x, y);
        if pos.is_normalized() {
            Self::Normalized(pos)
        } else {
            Self::Pixel {
                x: x.round() as i32,
                y: y.round() as i32,
            }
        }
    }
}

impl From<NormPos> for ScreenPos {
    fn from(pos: NormPos) -> Self {
        Self::Normalized(pos)
    }
}

impl WindowGeometry {
    /// Absolute desktop pixel for a window-relative position.
    #[must_use]
    pub fn to_screen(&self, pos: ScreenPos) -> (i32, i32) {
        match pos {
            ScreenPos::Normalized(p) => {
                let (x, y) = p.to_pixels(self.width, self.height);
                (self.left + x.round() as i32, self.top + y.round() as i32)
            }
            ScreenPos::Pixel { x, y } => (self.left + x, self.top + y),
        }
    }
}

/// Captures the game window.
pub trait ScreenCapture {
    /// Current window placement, or `None` if the window is gone.
    fn window_geometry(&self) -> Option<WindowGeometry>;

    /// Capture a normalized region of the window.
    ///
    /// # Errors
    ///
    /// [`BotError::WindowLost`] if the window vanished, otherwise
    /// [`BotError::Collaborator`].
    fn capture_region(&self, region: NormRect) -> Result<RgbImage>;
}

/// Optical number recognition.
pub trait NumberReader {
    /// The number shown in the image, if one can be read.
    fn read_number(&self, image: &RgbImage) -> Option<u32>;
}

/// Pointer and keyboard injection, in absolute desktop pixels.
pub trait InputDriver {
    /// Move the pointer.
    ///
    /// # Errors
    ///
    /// [`BotError::Collaborator`] when the backend refuses the event.
    fn move_to(&self, x: i32, y: i32) -> Result<()>;

    /// Move the pointer and left-click.
    ///
    /// # Errors
    ///
    /// [`BotError::Collaborator`] when the backend refuses the event.
    fn click(&self, x: i32, y: i32) -> Result<()>;

    /// Press and release a key by name, e.g. `"q"` or `"esc"`.
    ///
    /// # Errors
    ///
    /// [`BotError::Collaborator`] when the backend refuses the event.
    fn press_key(&self, key: &str) -> Result<()>;
}

/// Window-relative input: resolves positions against the live geometry.
pub struct WindowInput<'a, C: ?Sized, I: ?Sized> {
    capture: &'a C,
    input: &'a I,
}

impl<'a, C, I> WindowInput<'a, C, I>
where
    C: ScreenCapture + ?Sized,
    I: InputDriver + ?Sized,
{
    /// Pair a capture backend (for geometry) with an input backend.
    pub fn new(capture: &'a C, input: &'a I) -> Self {
        Self { capture, input }
    }

    fn resolve(&self, pos: ScreenPos) -> Result<(i32, i32)> {
        let geometry = self.capture.window_geometry().ok_or(BotError::WindowLost)?;
        Ok(geometry.to_screen(pos))
    }

    /// Move the pointer over a window position.
    ///
    /// # Errors
    ///
    /// [`BotError::WindowLost`] without geometry, or the backend's error.
    pub fn move_to(&self, pos: impl Into<ScreenPos>) -> Result<()> {
        let (x, y) = self.resolve(pos.into())?;
        self.input.move_to(x, y)
    }

    /// Click a window position.
    ///
    /// # Errors
    ///
    /// [`BotError::WindowLost`] without geometry, or the backend's error.
    pub fn click(&self, pos: impl Into<ScreenPos>) -> Result<()> {
        let (x, y) = self.resolve(pos.into())?;
        self.input.click(x, y)
    }

    /// Press a key. Fails fast if the window is gone.
    ///
    /// # Errors
    ///
    /// [`BotError::WindowLost`] without geometry, or the backend's error.
    pub fn press_key(&self, key: &str) -> Result<()> {
        self.capture.window_geometry().ok_or(BotError::WindowLost)?;
        self.input.press_key(key)
    }
}

/// A captured image read through normalized positions.
#[derive(Debug, Clone)]
pub struct Frame(pub RgbImage);

impl PixelProbe for Frame {
    fn pixel(&self, at: NormPos) -> Option<Rgb> {
        let (width, height) = self.0.dimensions();
        if width == 0 || height == 0 || !at.is_normalized() {
            return None;
        }
        let (x, y) = at.to_pixel_index(width, height);
        Some(self.0.get_pixel(x, y).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Pixel;

    #[test]
    fn test_from_coords_threshold() {
        assert_eq!(
            ScreenPos::from_coords(0.5, 1.0),
            ScreenPos::Normalized(NormPos::new(0.5, 1.0))
        );
        assert_eq!(
            ScreenPos::from_coords(12.0, 0.5),
            ScreenPos::Pixel { x: 12, y: 1 }
        );
    }

    #[test]
    fn test_to_screen() {
        let geometry = WindowGeometry {
            left: 100,
            top: 50,
            width: 800,
            height: 600,
        };
        assert_eq!(geometry.to_screen(NormPos::new(0.5, 0.5).into()), (500, 350));
        assert_eq!(geometry.to_screen(ScreenPos::Pixel { x: 10, y: 20 }), (110, 70));
    }

    #[test]
    fn test_frame_pixel() {
        let mut image = RgbImage::new(10, 10);
        image.put_pixel(5, 5, Pixel([1, 2, 3]));
        image.put_pixel(9, 9, Pixel([9, 9, 9]));
        let frame = Frame(image);
        assert_eq!(frame.pixel(NormPos::new(0.5, 0.5)), Some([1, 2, 3]));
        assert_eq!(frame.pixel(NormPos::new(1.0, 1.0)), Some([9, 9, 9]));
        assert_eq!(frame.pixel(NormPos::new(1.1, 0.5)), None);
    }
}
