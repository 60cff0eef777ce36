//! # External collaborator contracts.
//!
//! The watchdog and the worker loop never touch the screen themselves; they
//! talk to these traits. Implementations wrap capture tools, OCR engines,
//! shape detectors and input injection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::frame::{Frame, Point};
use crate::error::RecognitionError;

/// Reports whether a battle is still running.
#[async_trait]
pub trait StatusProbe: Send + Sync + 'static {
    async fn is_battle_ongoing(&self) -> bool;
}

/// Produces the current screen contents.
#[async_trait]
pub trait ScreenSource: Send + Sync + 'static {
    async fn capture(&self) -> Result<Frame, RecognitionError>;
}

/// Reads text from a (pre-cropped) frame.
#[async_trait]
pub trait TextRecognizer: Send + Sync + 'static {
    /// Recognizes the text in `frame`, optionally restricted to `charset`.
    ///
    /// Fails with [`RecognitionError`] on unreadable input.
    async fn recognize(
        &self,
        frame: &Frame,
        charset: Option<&str>,
    ) -> Result<String, RecognitionError>;
}

/// Finds candidate interaction points in a frame.
///
/// The result is finite; calling again on the same frame restarts the sequence.
pub trait ShapeDetector: Send + Sync + 'static {
    fn find_points(&self, frame: &Frame) -> Vec<Point>;
}

/// Identifies which page of the environment a frame shows.
#[async_trait]
pub trait PageReader: Send + Sync + 'static {
    async fn current_page(&self, frame: &Frame) -> Result<u32, RecognitionError>;
}

/// Swipe direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// What to click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Absolute screen coordinate.
    Point(Point),
    /// A named control resolved by the navigator (e.g. `"auto_duel"`).
    Control(Arc<str>),
}

/// Side-effecting navigation primitives.
#[async_trait]
pub trait Navigator: Send + Sync + 'static {
    /// Brings the UI back to the reference state (e.g. dismiss overlays via the back control).
    async fn ensure_reference(&self);

    /// Lets the UI settle for `delay`.
    async fn wait_for_ui(&self, delay: Duration);

    async fn swipe(&self, direction: Direction);

    async fn click(&self, target: Target);
}
