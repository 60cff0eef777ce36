//! # UI collaborators and polling helpers.
//!
//! - collaborator traits for the external tools (probe, capture, OCR, shapes, navigation)
//! - [`Frame`], [`Region`], [`Point`]: minimal image/geometry types shared by them
//! - [`wait_for`], [`wait_for_text`]: bounded, cancellable polling
//! - [`possible_battle_points`]: opportunity detection on the current page

mod capabilities;
mod frame;
mod opportunities;
mod poll;

pub use capabilities::{
    Direction, Navigator, PageReader, ScreenSource, ShapeDetector, StatusProbe, Target,
    TextRecognizer,
};
pub use frame::{Frame, Point, Region};
pub use opportunities::{Opportunities, Opportunity, possible_battle_points};
pub use poll::{TextWait, wait_for, wait_for_text};
