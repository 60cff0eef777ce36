//! Opportunity detection: candidate points on the current page.

use super::capabilities::{PageReader, ScreenSource, ShapeDetector};
use super::frame::Point;
use crate::error::RecognitionError;

/// A place worth acting on, tagged with the page it was seen on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opportunity {
    pub point: Point,
    pub page: u32,
}

/// Lazy, finite sequence of [`Opportunity`] values from one capture.
#[derive(Debug)]
pub struct Opportunities {
    points: std::vec::IntoIter<Point>,
    page: u32,
}

impl Iterator for Opportunities {
    type Item = Opportunity;

    fn next(&mut self) -> Option<Opportunity> {
        let point = self.points.next()?;
        Some(Opportunity {
            point,
            page: self.page,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

/// Captures one frame and yields every detected point on it.
///
/// Call again for a fresh capture.
pub async fn possible_battle_points(
    screen: &dyn ScreenSource,
    detector: &dyn ShapeDetector,
    pages: &dyn PageReader,
) -> Result<Opportunities, RecognitionError> {
    let frame = screen.capture().await?;
    let page = pages.current_page(&frame).await?;
    Ok(Opportunities {
        points: detector.find_points(&frame).into_iter(),
        page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedPage, FixedPoints, ScriptedScreen};

    #[tokio::test]
    async fn points_are_tagged_with_current_page() {
        let screen = ScriptedScreen::solid(4, 4);
        let detector = FixedPoints(vec![Point::new(1, 2), Point::new(3, 1)]);

        let found: Vec<_> = possible_battle_points(&screen, &detector, &FixedPage(Ok(2)))
            .await
            .unwrap()
            .collect();

        assert_eq!(
            found,
            vec![
                Opportunity { point: Point::new(1, 2), page: 2 },
                Opportunity { point: Point::new(3, 1), page: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn page_errors_propagate() {
        let screen = ScriptedScreen::solid(4, 4);
        let detector = FixedPoints(vec![]);
        let page = FixedPage(Err(RecognitionError::Unreadable { reason: "no page".into() }));

        let res = possible_battle_points(&screen, &detector, &page).await;
        assert!(matches!(res, Err(RecognitionError::Unreadable { .. })));
    }
}
