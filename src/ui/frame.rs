//! Grayscale frames and screen geometry.

use std::sync::Arc;

use crate::error::RecognitionError;

/// Screen coordinate in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle; `min` inclusive, `max` exclusive.
///
/// Corners given in either order are normalized, so swapped bounds in data
/// files still describe the intended area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    min: Point,
    max: Point,
}

impl Region {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Center point, used as a click target for named UI areas.
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }
}

/// Immutable 8-bit grayscale frame, row-major. Cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Frame {
    /// Wraps raw pixels; `pixels.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RecognitionError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RecognitionError::Unreadable {
                reason: format!("expected {expected} pixels, got {}", pixels.len()),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Arc::from(Vec::new()),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Copies the part of the frame covered by `region` (clipped to the frame).
    pub fn crop(&self, region: Region) -> Result<Frame, RecognitionError> {
        if self.is_empty() {
            return Err(RecognitionError::EmptyFrame);
        }
        let clip = |v: i32, hi: u32| v.clamp(0, hi as i32) as u32;
        let (x0, x1) = (clip(region.min.x, self.width), clip(region.max.x, self.width));
        let (y0, y1) = (clip(region.min.y, self.height), clip(region.max.y, self.height));
        if x0 == x1 || y0 == y1 {
            return Err(RecognitionError::Unreadable {
                reason: format!("region {region:?} outside {}x{} frame", self.width, self.height),
            });
        }

        let mut out = Vec::with_capacity(((x1 - x0) * (y1 - y0)) as usize);
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            out.extend_from_slice(&self.pixels[row + x0 as usize..row + x1 as usize]);
        }
        Frame::new(x1 - x0, y1 - y0, out)
    }
}
