//! # Bounded UI polling.
//!
//! [`wait_for`] re-evaluates an async condition until it holds, the attempt
//! budget of a [`PollPolicy`] runs out, or the caller's token is cancelled.
//! [`wait_for_text`] builds on it to wait for a label to appear on screen and
//! click it.
//!
//! ## Flow
//! ```text
//! loop (attempts) {
//!   ├─► token cancelled      → Ok(false)
//!   ├─► check() → Ok(true)   → Ok(true)
//!   ├─► check() → Ok(false)  → wait_for_ui(on_false_wait)
//!   └─► check() → Err(e)     → wait_for_ui(on_error_wait)
//! }                            (no wait after the last attempt)
//! → Err(Exhausted)
//! ```

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::capabilities::{Navigator, ScreenSource, Target, TextRecognizer};
use super::frame::Region;
use crate::config::PollPolicy;
use crate::error::LoopError;

/// Polls `check` until it returns `Ok(true)`.
///
/// Failed evaluations are logged and retried; only exhaustion is an error.
pub async fn wait_for<F, Fut>(
    nav: &dyn Navigator,
    policy: PollPolicy,
    cancel: &CancellationToken,
    what: &str,
    mut check: F,
) -> Result<bool, LoopError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, LoopError>>,
{
    tracing::debug!(what, "waiting for condition");
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        if cancel.is_cancelled() {
            return Ok(false);
        }
        let wait = match check().await {
            Ok(true) => return Ok(true),
            Ok(false) => policy.on_false_wait,
            Err(e) => {
                tracing::debug!(what, attempt, error = %e, "condition check failed");
                policy.on_error_wait
            }
        };
        if attempt < attempts {
            nav.wait_for_ui(wait).await;
        }
    }
    Err(LoopError::Exhausted {
        what: what.to_string(),
        attempts,
    })
}

/// Describes a label to wait for.
#[derive(Clone, Debug)]
pub struct TextWait<'a> {
    /// Screen area holding the label.
    pub region: Region,
    /// Optional OCR whitelist.
    pub charset: Option<&'a str>,
    /// Any of these substrings counts as a match.
    pub needles: &'a [&'a str],
    /// Clicked once the label appears.
    pub target: Target,
}

/// Waits until one of `wait.needles` is read inside `wait.region`, then clicks `wait.target`.
///
/// Recognition failures count as failed attempts. Returns `Ok(false)` without
/// clicking if `cancel` fires first.
pub async fn wait_for_text(
    screen: &dyn ScreenSource,
    ocr: &dyn TextRecognizer,
    nav: &dyn Navigator,
    policy: PollPolicy,
    cancel: &CancellationToken,
    wait: TextWait<'_>,
) -> Result<bool, LoopError> {
    let TextWait {
        region,
        charset,
        needles,
        target,
    } = wait;
    let what = needles.join("|");

    let found = wait_for(nav, policy, cancel, &what, move || async move {
        let frame = screen.capture().await?;
        let area = frame.crop(region)?;
        let text = ocr.recognize(&area, charset).await?;
        Ok::<bool, LoopError>(needles.iter().any(|n| text.contains(n)))
    })
    .await?;

    if found {
        nav.click(target).await;
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognitionError;
    use crate::testing::{NavCall, RecordingNavigator, ScriptedScreen, ScriptedText};
    use crate::ui::Point;
    use std::time::Duration;

    fn policy() -> PollPolicy {
        PollPolicy {
            attempts: 3,
            on_error_wait: Duration::from_millis(10),
            on_false_wait: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn returns_true_on_first_success() {
        let nav = RecordingNavigator::default();
        let ok = wait_for(&nav, policy(), &CancellationToken::new(), "x", || async {
            Ok(true)
        })
        .await
        .unwrap();
        assert!(ok);
        assert!(nav.calls().is_empty());
    }

    #[tokio::test]
    async fn waits_differ_for_false_and_error() {
        let nav = RecordingNavigator::default();
        let mut n = 0;
        let res = wait_for(&nav, policy(), &CancellationToken::new(), "label", || {
            n += 1;
            let out = match n {
                1 => Ok(false),
                2 => Err(LoopError::from(RecognitionError::EmptyFrame)),
                _ => Ok(false),
            };
            async move { out }
        })
        .await;

        assert!(matches!(res, Err(LoopError::Exhausted { attempts: 3, .. })));
        assert_eq!(
            nav.calls(),
            vec![
                NavCall::Wait(Duration::from_millis(20)),
                NavCall::Wait(Duration::from_millis(10)),
            ]
        );
    }

    #[tokio::test]
    async fn exhaustion_returns_without_trailing_wait() {
        let nav = RecordingNavigator::default();
        let single = PollPolicy {
            attempts: 1,
            ..policy()
        };
        let res = wait_for(&nav, single, &CancellationToken::new(), "x", || async {
            Ok(false)
        })
        .await;

        assert!(matches!(res, Err(LoopError::Exhausted { attempts: 1, .. })));
        assert!(nav.calls().is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let nav = RecordingNavigator::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ok = wait_for(&nav, policy(), &cancel, "x", || async { Ok(true) })
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn text_wait_tolerates_ocr_errors_then_clicks() {
        let nav = RecordingNavigator::default();
        let screen = ScriptedScreen::solid(8, 8);
        let ocr = ScriptedText::new(vec![
            Err(RecognitionError::Unreadable { reason: "blur".into() }),
            Ok("Auto Du".into()),
            Ok("  AutoDuel ".into()),
        ]);
        let target = Target::Point(Point::new(4, 4));

        let ok = wait_for_text(
            &screen,
            &ocr,
            &nav,
            policy(),
            &CancellationToken::new(),
            TextWait {
                region: Region::new(Point::new(0, 0), Point::new(8, 2)),
                charset: Some("Auto-Duel"),
                needles: &["Auto-Duel", "AutoDuel"],
                target: target.clone(),
            },
        )
        .await
        .unwrap();

        assert!(ok);
        assert_eq!(ocr.charsets(), vec![Some("Auto-Duel".to_string()); 3]);
        assert_eq!(nav.calls().last(), Some(&NavCall::Click(target)));
    }
}
