//! # Example: watch
//!
//! Runs the automation loop against fake screen collaborators while the
//! battle watchdog re-polls in the background, then stops the worker from the
//! driver through the registry.
//!
//! ## Flow
//! ```text
//! main
//!   ├─► spawn_listener(bus) ──► SubscriberSet ──► LogWriter (tracing)
//!   ├─► AutomationLoop::spawn()
//!   │     └─► DemoScanner::scan
//!   │           ├─► possible_battle_points ──► click first opportunity
//!   │           ├─► wait_for_text("Auto-Duel") ──► click control
//!   │           └─► BattleCoordinator::arm_default(false)
//!   │                 └─► TokioScheduler ──► on_fire ──► FakeProbe
//!   └─► sleep, WorkerRegistry::request_stop()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example watch
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use duelvisor::subscribers::spawn_listener;
use duelvisor::ui::{
    Direction, Frame, Navigator, PageReader, Point, Region, ScreenSource, ShapeDetector,
    StatusProbe, Target, TextRecognizer, TextWait, possible_battle_points, wait_for_text,
};
use duelvisor::{
    AutomationLoop, BattleCoordinator, Bus, Config, LogWriter, LoopError, RecognitionError,
    ScanContext, Scanner, Subscribe, SubscriberSet, TokioScheduler, WorkerRegistry,
};
use tracing_subscriber::EnvFilter;

/// Navigator that only logs and sleeps.
struct FakeNavigator;

#[async_trait]
impl Navigator for FakeNavigator {
    async fn ensure_reference(&self) {
        tracing::trace!("back to reference screen");
    }

    async fn wait_for_ui(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    async fn swipe(&self, direction: Direction) {
        tracing::info!(?direction, "swipe");
    }

    async fn click(&self, target: Target) {
        tracing::info!(?target, "click");
    }
}

struct FakeScreen;

#[async_trait]
impl ScreenSource for FakeScreen {
    async fn capture(&self) -> Result<Frame, RecognitionError> {
        Frame::new(64, 48, vec![0; 64 * 48])
    }
}

/// Reads garbage once, then the label.
#[derive(Default)]
struct FakeOcr {
    calls: AtomicUsize,
}

#[async_trait]
impl TextRecognizer for FakeOcr {
    async fn recognize(
        &self,
        _frame: &Frame,
        _charset: Option<&str>,
    ) -> Result<String, RecognitionError> {
        match self.calls.fetch_add(1, Ordering::Relaxed) % 2 {
            0 => Err(RecognitionError::Unreadable {
                reason: "glare".into(),
            }),
            _ => Ok("Auto-Duel".into()),
        }
    }
}

struct FakeShapes;

impl ShapeDetector for FakeShapes {
    fn find_points(&self, _frame: &Frame) -> Vec<Point> {
        vec![Point::new(12, 30), Point::new(40, 18)]
    }
}

struct FakePages;

#[async_trait]
impl PageReader for FakePages {
    async fn current_page(&self, _frame: &Frame) -> Result<u32, RecognitionError> {
        Ok(1)
    }
}

/// Battle lasts for `remaining` probes.
struct FakeProbe {
    remaining: AtomicUsize,
}

#[async_trait]
impl StatusProbe for FakeProbe {
    async fn is_battle_ongoing(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

struct DemoScanner {
    cfg: Config,
    nav: Arc<FakeNavigator>,
    screen: FakeScreen,
    ocr: FakeOcr,
    shapes: FakeShapes,
    pages: FakePages,
}

#[async_trait]
impl Scanner for DemoScanner {
    async fn scan(&self, cx: &ScanContext<'_>) -> Result<(), LoopError> {
        let mut found = possible_battle_points(&self.screen, &self.shapes, &self.pages).await?;
        let Some(first) = found.next() else {
            return Ok(());
        };
        tracing::info!(iteration = cx.iteration, page = first.page, point = ?first.point, "opportunity");
        self.nav.click(Target::Point(first.point)).await;

        let needles = ["Auto-Duel", "AutoDuel"];
        let started = wait_for_text(
            &self.screen,
            &self.ocr,
            self.nav.as_ref(),
            self.cfg.poll,
            cx.handle.stop_token(),
            TextWait {
                region: Region::new(Point::new(0, 40), Point::new(64, 48)),
                charset: None,
                needles: &needles,
                target: Target::Control("auto_duel".into()),
            },
        )
        .await?;

        if let (true, Some(coord)) = (started, cx.coordinator) {
            coord.arm_default(false)?;
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let mut cfg = Config::default();
    cfg.check_delay = Duration::from_millis(200);
    cfg.ui_settle = Duration::from_millis(50);
    cfg.poll.on_error_wait = Duration::from_millis(20);
    cfg.poll.on_false_wait = Duration::from_millis(40);

    let bus = Bus::new(cfg.bus_capacity_clamped());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let set = Arc::new(SubscriberSet::new(subs));
    let listener = spawn_listener(&bus, Arc::clone(&set));

    let scheduler = Arc::new(TokioScheduler::new()?);
    let probe = Arc::new(FakeProbe {
        remaining: AtomicUsize::new(3),
    });
    let coordinator = BattleCoordinator::with_bus(&cfg, scheduler.clone(), probe, bus.clone());
    let registry = WorkerRegistry::with_bus(bus.clone());

    let nav = Arc::new(FakeNavigator);
    let scanner = DemoScanner {
        cfg: cfg.clone(),
        nav: Arc::clone(&nav),
        screen: FakeScreen,
        ocr: FakeOcr::default(),
        shapes: FakeShapes,
        pages: FakePages,
    };

    let worker = AutomationLoop::builder(cfg, nav)
        .with_registry(Arc::clone(&registry))
        .with_scanner(Arc::new(scanner))
        .with_coordinator(Arc::clone(&coordinator))
        .with_bus(bus.clone())
        .build()
        .spawn();

    tokio::time::sleep(Duration::from_millis(300)).await;
    registry.request_stop().await;

    let report = worker.await??;
    tracing::info!(?report, "worker finished");

    // Let the watchdog observe the end of the battle.
    while coordinator.is_active() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tracing::info!("battle over");

    scheduler.shutdown();
    listener.abort();
    let _ = listener.await;
    if let Ok(set) = Arc::try_unwrap(set) {
        set.shutdown().await;
    }
    Ok(())
}
