//! Test doubles shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::{RecognitionError, SchedulerError};
use crate::scheduler::{Job, JobId, WatchdogScheduler};
use crate::ui::{
    Direction, Frame, Navigator, PageReader, Point, ScreenSource, ShapeDetector, StatusProbe,
    Target, TextRecognizer,
};

/// Scheduler that never fires on its own; tests take jobs out and run them.
#[derive(Default)]
pub(crate) struct ManualScheduler {
    jobs: Mutex<Vec<(JobId, Job)>>,
    scheduled: AtomicUsize,
    cancelled: AtomicUsize,
    fail_next: AtomicBool,
}

impl ManualScheduler {
    pub(crate) fn pending_ids(&self) -> Vec<JobId> {
        self.jobs.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Removes a job as if it started firing; later cancels report `JobNotFound`.
    pub(crate) fn take(&self, id: &JobId) -> Option<Job> {
        let mut jobs = self.jobs.lock().unwrap();
        let pos = jobs.iter().position(|(j, _)| j == id)?;
        Some(jobs.remove(pos).1)
    }

    pub(crate) fn scheduled(&self) -> usize {
        self.scheduled.load(Ordering::SeqCst)
    }

    pub(crate) fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Makes the next `schedule` call fail with `Closed`.
    pub(crate) fn fail_next_schedule(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl WatchdogScheduler for ManualScheduler {
    fn schedule(&self, id: JobId, _run_at: Instant, job: Job) -> Result<(), SchedulerError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SchedulerError::Closed);
        }
        self.jobs.lock().unwrap().push((id, job));
        self.scheduled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn cancel(&self, id: &JobId) -> Result<(), SchedulerError> {
        match self.take(id) {
            Some(_) => {
                self.cancelled.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(SchedulerError::JobNotFound { id: id.clone() }),
        }
    }
}

/// Probe reporting an ongoing battle for the first `ongoing` calls.
pub(crate) struct ScriptedProbe {
    ongoing: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub(crate) fn always(ongoing: bool) -> Self {
        Self::ongoing_for(if ongoing { usize::MAX } else { 0 })
    }

    pub(crate) fn ongoing_for(n: usize) -> Self {
        Self {
            ongoing: AtomicUsize::new(n),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusProbe for ScriptedProbe {
    async fn is_battle_ongoing(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ongoing
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NavCall {
    EnsureReference,
    Wait(Duration),
    Swipe(Direction),
    Click(Target),
}

/// Navigator that records every call and returns immediately.
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    calls: Mutex<Vec<NavCall>>,
}

impl RecordingNavigator {
    pub(crate) fn calls(&self) -> Vec<NavCall> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: NavCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn ensure_reference(&self) {
        self.push(NavCall::EnsureReference);
    }

    async fn wait_for_ui(&self, delay: Duration) {
        self.push(NavCall::Wait(delay));
    }

    async fn swipe(&self, direction: Direction) {
        self.push(NavCall::Swipe(direction));
    }

    async fn click(&self, target: Target) {
        self.push(NavCall::Click(target));
    }
}

/// Screen that always captures the same frame.
pub(crate) struct ScriptedScreen(Frame);

impl ScriptedScreen {
    pub(crate) fn solid(width: u32, height: u32) -> Self {
        let pixels = vec![255; width as usize * height as usize];
        Self(Frame::new(width, height, pixels).unwrap())
    }
}

#[async_trait]
impl ScreenSource for ScriptedScreen {
    async fn capture(&self) -> Result<Frame, RecognitionError> {
        Ok(self.0.clone())
    }
}

/// Recognizer replaying scripted results; repeats the last one when exhausted.
pub(crate) struct ScriptedText {
    script: Mutex<Vec<Result<String, RecognitionError>>>,
    charsets: Mutex<Vec<Option<String>>>,
}

impl ScriptedText {
    pub(crate) fn new(mut script: Vec<Result<String, RecognitionError>>) -> Self {
        script.reverse();
        Self {
            script: Mutex::new(script),
            charsets: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn charsets(&self) -> Vec<Option<String>> {
        self.charsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextRecognizer for ScriptedText {
    async fn recognize(
        &self,
        _frame: &Frame,
        charset: Option<&str>,
    ) -> Result<String, RecognitionError> {
        self.charsets.lock().unwrap().push(charset.map(str::to_string));
        let mut script = self.script.lock().unwrap();
        match script.len() {
            0 => Ok(String::new()),
            1 => script[0].clone(),
            _ => script.pop().unwrap_or_else(|| Ok(String::new())),
        }
    }
}

pub(crate) struct FixedPoints(pub(crate) Vec<Point>);

impl ShapeDetector for FixedPoints {
    fn find_points(&self, _frame: &Frame) -> Vec<Point> {
        self.0.clone()
    }
}

pub(crate) struct FixedPage(pub(crate) Result<u32, RecognitionError>);

#[async_trait]
impl PageReader for FixedPage {
    async fn current_page(&self, _frame: &Frame) -> Result<u32, RecognitionError> {
        self.0.clone()
    }
}
