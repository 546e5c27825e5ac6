//! The Hive settings-panel test sequence.
//!
//! A strictly linear run: Connect → Calibrate → {Capture → Act → Wait →
//! Capture → Assert}* → Cleanup → Report. Failed assertions are recorded and
//! the sequence continues; the only fatal error is not finding the window at
//! all. Every capture is persisted as a numbered PNG artifact for post-hoc
//! inspection.

use console::style;
use mirada::{
    connect_window, ArtifactStore, Calibration, ChannelRule, CoordinateMapper, DpiContext,
    HarnessResult, InputService, KeyAction, LogicalTarget, RegionDiff, RunLog, RunSummary,
    ScreenCapture, Settle, SignatureScanner, WindowQuery, WindowService,
};
use std::path::PathBuf;

/// Pixels of the left sidebar strip excluded from content-area comparisons
const CONTENT_MARGIN_PX: u32 = 100;

/// Value typed into the API-key field (cleared again during cleanup)
const TEST_KEY: &str = "sk-test-auto-12345";

/// Run-wide configuration, built once in `main` and passed down
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Directory for screenshot artifacts
    pub screenshot_dir: PathBuf,
    /// Dissimilarity threshold for region comparisons
    pub threshold: f64,
    /// Settle waits (empirically tuned base durations times one multiplier)
    pub settle: Settle,
    /// Only print the final summary
    pub quiet: bool,
}

/// Execute the full suite against the supplied OS services.
///
/// # Errors
///
/// Only connection failure (window not found after every discovery strategy)
/// and artifact I/O failures abort the run; assertion failures are recorded
/// in the returned summary instead.
pub fn run<W, C, I, D>(
    windows: &W,
    capture: &mut C,
    input: &mut I,
    dpi: &D,
    config: &SuiteConfig,
) -> HarnessResult<RunSummary>
where
    W: WindowService,
    C: ScreenCapture,
    I: InputService,
    D: DpiContext,
{
    let mut log = RunLog::new();
    let settle = config.settle;
    let diff = RegionDiff::new().with_threshold(config.threshold);

    // DPI awareness must be declared before any geometry is queried so that
    // window rectangles, captures, and injected clicks share one pixel space.
    if !dpi.declare_awareness() {
        tracing::warn!("DPI awareness declaration failed; coordinate math may be unreliable");
    }

    banner(config, "Hive Settings Panel - Visual Automation Test");

    // ---------------------------------------------------------------
    // Step 1: Connect and calibrate
    // ---------------------------------------------------------------
    say(config, "\n[1] Connecting to Hive window...");
    let strategies = [
        WindowQuery::ProcessName("hive.exe".to_string()),
        WindowQuery::TitlePattern(".*[Hh]ive.*".to_string()),
        WindowQuery::TitleContains("hive".to_string()),
    ];
    let (handle, window) = connect_window(windows, &strategies)?;
    say(config, &format!("  Window rect: {window}"));
    record(
        &mut log,
        config,
        "Window found",
        true,
        format!("{}x{}", window.width(), window.height()),
    );

    if let Err(err) = windows.focus(&handle) {
        tracing::debug!(%err, "focus failed, first click will raise the window");
    }
    settle.pause(500);

    let store = ArtifactStore::new(&config.screenshot_dir)?;
    let cal_shot = capture.capture(Some(window))?;
    store.save("00_calibration", &cal_shot)?;

    let calibration = Calibration::establish(dpi, window, &cal_shot);
    say(config, &format!("  Coordinate scale factor: {}", calibration.scale));
    let mapper = CoordinateMapper::new(calibration);

    // Auto-detect the active (cyan-highlighted) sidebar button. An empty
    // result just means the computed layout applies.
    let strip = cal_shot.crop(0, 0, mapper.sidebar().scan_strip_px, cal_shot.height());
    let clusters = SignatureScanner::new().scan(&strip, &ChannelRule::cyan_highlight());
    if let Some(active) = clusters.first() {
        say(
            config,
            &format!(
                "  Detected active button at y={}, x~{}",
                active.center_y(),
                active.center_x()
            ),
        );
    }

    // ---------------------------------------------------------------
    // Step 2: Navigate to Chat (baseline; active on a fresh start)
    // ---------------------------------------------------------------
    say(config, "\n[2] Navigating to Chat panel (baseline)...");
    input.click(mapper.resolve(LogicalTarget::CHAT, &clusters))?;
    settle.pause(800);
    let chat_img = capture.capture(Some(window))?;
    store.save("01_chat_panel", &chat_img)?;

    // ---------------------------------------------------------------
    // Step 3: Navigate to Settings
    // ---------------------------------------------------------------
    say(config, "\n[3] Navigating to Settings panel...");
    input.click(mapper.resolve(LogicalTarget::SETTINGS, &clusters))?;
    settle.pause(1000);
    let settings_img = capture.capture(Some(window))?;
    store.save("02_settings_panel", &settings_img)?;

    let result = diff.differs(
        &chat_img.content_area(CONTENT_MARGIN_PX),
        &settings_img.content_area(CONTENT_MARGIN_PX),
    );
    record(
        &mut log,
        config,
        "Settings panel differs from Chat panel",
        result.changed,
        format!("mean_diff={:.2}", result.score),
    );

    // ---------------------------------------------------------------
    // Step 4: Settings content check
    // ---------------------------------------------------------------
    say(config, "\n[4] Verifying Settings panel content...");
    let (hl, ht, hr, hb) = mapper.header_region_local();
    let header = settings_img.crop(hl, ht, hr, hb);
    let avg = header.mean_brightness();
    record(
        &mut log,
        config,
        "Settings header area has content",
        avg > 5.0 && avg < 250.0,
        format!("avg_brightness={avg:.1}"),
    );

    // ---------------------------------------------------------------
    // Step 5: API key input field
    // ---------------------------------------------------------------
    say(config, "\n[5] Testing API key input field...");
    let input_point = mapper.api_key_input();
    let input_region = mapper.input_region();

    let before_input = capture.capture(Some(input_region))?;
    store.save("03a_input_before", &before_input)?;

    say(
        config,
        &format!("  Clicking API key input at ({}, {})", input_point.x, input_point.y),
    );
    input.click(input_point)?;
    settle.pause(500);

    input.send_keys(&[KeyAction::SelectAll])?;
    settle.pause(100);
    input.send_keys(&[KeyAction::Delete])?;
    settle.pause(200);
    input.send_keys(&[KeyAction::Text(TEST_KEY.to_string())])?;
    settle.pause(500);

    let after_input = capture.capture(Some(input_region))?;
    store.save("03b_input_after", &after_input)?;
    store.save("03c_full_after_typing", &capture.capture(Some(window))?)?;

    let result = diff.differs(&before_input, &after_input);
    record(
        &mut log,
        config,
        "Input field changed after typing",
        result.changed,
        format!("mean_diff={:.2}", result.score),
    );

    // ---------------------------------------------------------------
    // Step 6: Tab to trigger blur (auto-save)
    // ---------------------------------------------------------------
    say(config, "\n[6] Pressing Tab to trigger blur...");
    let badge_region = mapper.badge_region();
    let before_badge = capture.capture(Some(badge_region))?;
    store.save("04a_badge_before", &before_badge)?;

    input.send_keys(&[KeyAction::Tab])?;
    settle.pause(1000);

    let after_badge = capture.capture(Some(badge_region))?;
    store.save("04b_badge_after", &after_badge)?;
    store.save("04c_full_after_blur", &capture.capture(Some(window))?)?;

    let result = diff.differs(&before_badge, &after_badge);
    record(
        &mut log,
        config,
        "Badge region updated after blur",
        result.changed,
        format!("mean_diff={:.2}", result.score),
    );

    // ---------------------------------------------------------------
    // Step 7: Scroll down
    // ---------------------------------------------------------------
    say(config, "\n[7] Scrolling to reveal more sections...");
    let center = mapper.window_center();
    let before_scroll = capture.capture(Some(window))?;
    store.save("05a_before_scroll", &before_scroll)?;

    input.click(center)?;
    settle.pause(200);
    input.scroll(center, -5)?;
    settle.pause(800);

    let after_scroll = capture.capture(Some(window))?;
    store.save("05b_after_scroll", &after_scroll)?;

    let result = diff.differs(
        &before_scroll.content_area(CONTENT_MARGIN_PX),
        &after_scroll.content_area(CONTENT_MARGIN_PX),
    );
    record(
        &mut log,
        config,
        "Content scrolled down",
        result.changed,
        format!("mean_diff={:.2}", result.score),
    );

    // ---------------------------------------------------------------
    // Step 8: Files -> Settings round-trip
    // ---------------------------------------------------------------
    say(config, "\n[8] Testing panel navigation: Files -> Settings round-trip...");
    input.click(mapper.resolve(LogicalTarget::FILES, &clusters))?;
    settle.pause(800);
    let files_img = capture.capture(Some(window))?;
    store.save("06a_files_panel", &files_img)?;

    input.click(mapper.resolve(LogicalTarget::SETTINGS, &clusters))?;
    settle.pause(800);
    let settings_again = capture.capture(Some(window))?;
    store.save("06b_settings_again", &settings_again)?;

    let result = diff.differs(
        &files_img.content_area(CONTENT_MARGIN_PX),
        &settings_again.content_area(CONTENT_MARGIN_PX),
    );
    record(
        &mut log,
        config,
        "Files and Settings panels are visually different",
        result.changed,
        format!("mean_diff={:.2}", result.score),
    );

    // ---------------------------------------------------------------
    // Step 9: Cleanup - clear the test input
    // ---------------------------------------------------------------
    say(config, "\n[9] Cleaning up test data...");
    input.scroll(center, 10)?;
    settle.pause(500);

    input.click(input_point)?;
    settle.pause(300);
    input.send_keys(&[KeyAction::SelectAll, KeyAction::Delete])?;
    settle.pause(200);
    input.send_keys(&[KeyAction::Tab])?;
    settle.pause(500);

    store.save("07_final", &capture.capture(Some(window))?)?;
    record(&mut log, config, "Cleanup completed", true, String::new());

    // ---------------------------------------------------------------
    // Report
    // ---------------------------------------------------------------
    say(config, &format!("\n  Screenshots: {}/", store.dir().display()));
    for entry in store.list()? {
        say(config, &format!("    {} ({} bytes)", entry.file_name, entry.bytes));
    }

    let summary = log.summary();
    let report = std::fs::File::create(config.screenshot_dir.join("results.json"))?;
    serde_json::to_writer_pretty(report, &summary)?;

    print_summary(&summary);
    Ok(summary)
}

fn record(log: &mut RunLog, config: &SuiteConfig, name: &str, passed: bool, detail: String) {
    if !config.quiet {
        let mark = if passed {
            style("+").green().to_string()
        } else {
            style("X").red().to_string()
        };
        let suffix = if detail.is_empty() {
            String::new()
        } else {
            format!(" -- {detail}")
        };
        println!("  [{mark}] {name}{suffix}");
    }
    log.check(name, passed, detail);
}

fn banner(config: &SuiteConfig, title: &str) {
    if config.quiet {
        return;
    }
    println!("{}", "=".repeat(60));
    println!("{}", style(title).bold());
    println!("{}", "=".repeat(60));
}

fn say(config: &SuiteConfig, message: &str) {
    if !config.quiet {
        println!("{message}");
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "=".repeat(60));
    let counts = format!("Results: {}/{} passed", summary.passed, summary.total);
    if summary.all_passed() {
        println!("{}", style(counts).green().bold());
    } else {
        println!("{}", style(counts).red().bold());
        println!("FAILURES:");
        for failure in summary.failures() {
            println!("  - {}: {}", failure.name, failure.detail);
        }
    }
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mirada::{HarnessError, PixelBuffer, Point, Rect};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared state of the simulated application. Every injected event
    /// bumps the frame counter, which feeds the color every capture gets,
    /// so any before/after pair around an action differs.
    #[derive(Debug, Default)]
    struct FakeApp {
        frame: u32,
        clicks: Vec<Point>,
        keys: Vec<KeyAction>,
        scrolls: Vec<i32>,
    }

    impl FakeApp {
        fn channel(&self) -> u8 {
            (20 + (self.frame * 10) % 180) as u8
        }
    }

    struct FakeWindows {
        rect: Option<Rect>,
    }

    impl WindowService for FakeWindows {
        type Handle = ();

        fn find_window(&self, _query: &WindowQuery) -> mirada::HarnessResult<()> {
            self.rect.map(|_| ()).ok_or(HarnessError::WindowNotFound {
                message: "no such window".to_string(),
            })
        }

        fn geometry(&self, _handle: &()) -> mirada::HarnessResult<Rect> {
            self.rect.ok_or(HarnessError::GeometryError {
                message: "gone".to_string(),
            })
        }

        fn focus(&self, _handle: &()) -> mirada::HarnessResult<()> {
            Ok(())
        }
    }

    struct FakeCapture {
        app: Rc<RefCell<FakeApp>>,
        screen: Rect,
    }

    impl ScreenCapture for FakeCapture {
        fn capture(&mut self, region: Option<Rect>) -> mirada::HarnessResult<PixelBuffer> {
            let rect = region.unwrap_or(self.screen);
            let c = self.app.borrow().channel();
            let pixels = (rect.width() * rect.height()) as usize;
            let rgb = vec![c; pixels * 3];
            Ok(PixelBuffer::from_rgb(rect, rect.width(), rect.height(), rgb).unwrap())
        }
    }

    struct FakeInput {
        app: Rc<RefCell<FakeApp>>,
    }

    impl InputService for FakeInput {
        fn click(&mut self, at: Point) -> mirada::HarnessResult<()> {
            let mut app = self.app.borrow_mut();
            app.frame += 1;
            app.clicks.push(at);
            Ok(())
        }

        fn scroll(&mut self, _at: Point, wheel: i32) -> mirada::HarnessResult<()> {
            let mut app = self.app.borrow_mut();
            app.frame += 1;
            app.scrolls.push(wheel);
            Ok(())
        }

        fn send_keys(&mut self, keys: &[KeyAction]) -> mirada::HarnessResult<()> {
            let mut app = self.app.borrow_mut();
            app.frame += 1;
            app.keys.extend_from_slice(keys);
            Ok(())
        }
    }

    struct FakeDpi;

    impl DpiContext for FakeDpi {
        fn declare_awareness(&self) -> bool {
            true
        }

        fn primary_dpi(&self) -> Option<u32> {
            Some(96)
        }
    }

    fn test_config(dir: &std::path::Path) -> SuiteConfig {
        SuiteConfig {
            screenshot_dir: dir.to_path_buf(),
            threshold: mirada::DEFAULT_DIFF_THRESHOLD,
            // Keep the tuned pacing structure but make sleeps negligible.
            settle: Settle::new(0.001),
            quiet: true,
        }
    }

    #[test]
    fn test_full_suite_passes_against_responsive_app() {
        let tmp = tempfile::tempdir().unwrap();
        let window = Rect::new(100, 100, 900, 700);
        let app = Rc::new(RefCell::new(FakeApp::default()));
        let windows = FakeWindows { rect: Some(window) };
        let mut capture = FakeCapture {
            app: Rc::clone(&app),
            screen: Rect::new(0, 0, 1920, 1080),
        };
        let mut inputs = FakeInput {
            app: Rc::clone(&app),
        };

        let summary = run(
            &windows,
            &mut capture,
            &mut inputs,
            &FakeDpi,
            &test_config(tmp.path()),
        )
        .unwrap();

        assert!(summary.all_passed(), "failures: {:?}", summary.failures());
        assert_eq!(summary.total, 8);

        // The cleanup sequence must have cleared and blurred the field.
        let keys = app.borrow().keys.clone();
        assert_eq!(keys.iter().filter(|k| **k == KeyAction::Tab).count(), 2);
        assert!(keys.contains(&KeyAction::Text(TEST_KEY.to_string())));
    }

    #[test]
    fn test_suite_writes_numbered_artifacts_and_report() {
        let tmp = tempfile::tempdir().unwrap();
        let app = Rc::new(RefCell::new(FakeApp::default()));
        let windows = FakeWindows {
            rect: Some(Rect::new(0, 0, 800, 600)),
        };
        let mut capture = FakeCapture {
            app: Rc::clone(&app),
            screen: Rect::new(0, 0, 800, 600),
        };
        let mut inputs = FakeInput { app };

        run(
            &windows,
            &mut capture,
            &mut inputs,
            &FakeDpi,
            &test_config(tmp.path()),
        )
        .unwrap();

        let store = ArtifactStore::new(tmp.path()).unwrap();
        let names: Vec<String> = store.list().unwrap().into_iter().map(|e| e.file_name).collect();
        assert_eq!(names.len(), 14);
        assert_eq!(names.first().unwrap(), "00_calibration.png");
        assert_eq!(names.last().unwrap(), "07_final.png");

        let report = std::fs::read_to_string(tmp.path().join("results.json")).unwrap();
        let summary: RunSummary = serde_json::from_str(&report).unwrap();
        assert_eq!(summary.total, 8);
    }

    #[test]
    fn test_connection_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let app = Rc::new(RefCell::new(FakeApp::default()));
        let windows = FakeWindows { rect: None };
        let mut capture = FakeCapture {
            app: Rc::clone(&app),
            screen: Rect::new(0, 0, 800, 600),
        };
        let mut inputs = FakeInput { app };

        let err = run(
            &windows,
            &mut capture,
            &mut inputs,
            &FakeDpi,
            &test_config(tmp.path()),
        )
        .unwrap_err();

        assert!(matches!(err, HarnessError::WindowNotFound { .. }));
    }

    #[test]
    fn test_clicks_follow_computed_sidebar_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let window = Rect::new(100, 100, 900, 700);
        let app = Rc::new(RefCell::new(FakeApp::default()));
        let windows = FakeWindows { rect: Some(window) };
        let mut capture = FakeCapture {
            app: Rc::clone(&app),
            screen: Rect::new(0, 0, 1920, 1080),
        };
        let mut inputs = FakeInput {
            app: Rc::clone(&app),
        };

        run(
            &windows,
            &mut capture,
            &mut inputs,
            &FakeDpi,
            &test_config(tmp.path()),
        )
        .unwrap();

        // Scale 1.0: Chat at (135, 165), Settings at (135, 165 + 11*51).
        let clicks = app.borrow().clicks.clone();
        assert_eq!(clicks[0], Point::new(135, 165));
        assert_eq!(clicks[1], Point::new(135, 726));
    }
}
