// Interactive terminal front end: input, analysis runs and result display
use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event,
    },
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::analysis::{Pipeline, PipelineState};
use crate::config::AppConfig;
use crate::file_picker;
use crate::input_buffer::InputBuffer;
use crate::keyboard::{action_for, Action};
use crate::models::ModelRegistry;
use crate::pdf_extraction;
use crate::screen_mode::{InputMode, ResultTab, ScreenMode};
use crate::types::{AppFlags, Outcome, ProcessingFailure, TextStats};
use crate::ui_renderer;
use crate::{debug_error, debug_log, debug_trace};

pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A PDF picked in Upload mode, already reduced to its text.
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

struct ConfigWatch {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<notify::Event>>,
}

pub struct App {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ModelRegistry>,
    pub input_mode: InputMode,
    pub buffer: InputBuffer,
    pub pdf: Option<LoadedPdf>,
    pub pdf_error: Option<ProcessingFailure>,
    pub outcome: Option<Outcome>,
    pub tab: ResultTab,
    pub screen: ScreenMode,
    pub stage: PipelineState,
    pub flags: AppFlags,
    pub status_message: String,
    pub spinner_frame: usize,
    pub debug_scroll: usize,
    config_watch: Option<ConfigWatch>,
}

impl App {
    pub fn new(config: AppConfig, config_path: Option<PathBuf>, registry: Arc<ModelRegistry>) -> Self {
        let config_watch = match config_path {
            Some(path) if config.ui.watch_config && path.exists() => match watch_config(&path) {
                Ok(watch) => Some(watch),
                Err(e) => {
                    debug_error!("Config watcher unavailable: {}", e);
                    None
                }
            },
            _ => None,
        };
        debug_log(format!(
            "App ready (config watcher: {})",
            if config_watch.is_some() { "on" } else { "off" }
        ));

        Self {
            config: Arc::new(config),
            registry,
            input_mode: InputMode::PasteText,
            buffer: InputBuffer::new(),
            pdf: None,
            pdf_error: None,
            outcome: None,
            tab: ResultTab::Summary,
            screen: ScreenMode::Main,
            stage: PipelineState::Idle,
            flags: AppFlags::REDRAW,
            status_message: String::new(),
            spinner_frame: 0,
            debug_scroll: 0,
            config_watch,
        }
    }

    /// Text the next analysis would run on.
    pub fn current_text(&self) -> &str {
        match self.input_mode {
            InputMode::PasteText => self.buffer.text(),
            InputMode::UploadPdf => self.pdf.as_ref().map(|pdf| pdf.text.as_str()).unwrap_or(""),
        }
    }

    /// Live counts, shown only once there is something to count.
    pub fn current_stats(&self) -> Option<TextStats> {
        let text = self.current_text();
        if text.trim().is_empty() {
            None
        } else {
            Some(TextStats::of(text))
        }
    }

    pub fn is_busy(&self) -> bool {
        self.flags.contains(AppFlags::BUSY)
    }

    /// Apply an action that only touches in-memory state. Returns false for
    /// actions that need the terminal or the models.
    pub fn apply(&mut self, action: &Action) -> bool {
        match action {
            Action::Quit => self.flags.insert(AppFlags::EXIT),
            Action::ToggleInputMode => {
                self.input_mode = self.input_mode.toggle();
                debug_log(format!("Input mode: {}", self.input_mode.label()));
            }
            Action::ToggleDebug => {
                self.screen = self.screen.toggle();
                self.debug_scroll = 0;
            }
            Action::NextTab => self.tab = self.tab.next(),
            Action::PrevTab => self.tab = self.tab.prev(),
            Action::Insert(c) => self.buffer.insert_char(*c),
            Action::Newline => self.buffer.newline(),
            Action::Backspace => self.buffer.backspace(),
            Action::DeleteWord => self.buffer.delete_word(),
            Action::ClearInput => self.buffer.clear(),
            Action::ClearPdf => {
                self.pdf = None;
                self.pdf_error = None;
            }
            Action::ScrollDebug(delta) => {
                // Offset counts back from the newest line
                let max = crate::logging::snapshot().len();
                let next = self.debug_scroll as i64 - *delta as i64;
                self.debug_scroll = next.clamp(0, max as i64) as usize;
            }
            Action::None => return true,
            Action::Analyze | Action::OpenPicker => return false,
        }
        self.flags.insert(AppFlags::REDRAW);
        true
    }

    pub fn paste(&mut self, text: &str) {
        if self.screen == ScreenMode::Main && self.input_mode == InputMode::PasteText {
            self.buffer.insert_str(text);
            self.flags.insert(AppFlags::REDRAW);
        }
    }

    async fn dispatch(&mut self, action: Action) -> Result<()> {
        if self.apply(&action) {
            return Ok(());
        }
        match action {
            Action::Analyze => self.analyze().await,
            Action::OpenPicker => self.open_picker(),
            _ => Ok(()),
        }
    }

    fn open_picker(&mut self) -> Result<()> {
        self.flags.insert(AppFlags::PICKING);
        let picked = file_picker::pick_pdf_file(&file_picker::default_search_dirs());
        self.flags.remove(AppFlags::PICKING);
        self.flags.insert(AppFlags::REDRAW);
        if let Some(path) = picked? {
            self.status_message = PipelineState::Extracting.label().to_string();
            ui_renderer::render(self)?;
            self.load_pdf(&path);
        }
        Ok(())
    }

    /// Read and extract a PDF. Failures are kept for display, never raised.
    pub fn load_pdf(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug_log(format!("Loading PDF {}", path.display()));

        let extracted = fs::read(path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|bytes| Ok(pdf_extraction::extract_text_from_bytes(&name, &bytes)?));

        match extracted {
            Ok(text) => {
                self.status_message = format!("Loaded {}", name);
                self.pdf = Some(LoadedPdf { name, path: path.to_path_buf(), text });
                self.pdf_error = None;
            }
            Err(e) => {
                debug_error!("PDF load failed: {:#}", e);
                self.status_message.clear();
                self.pdf = None;
                self.pdf_error = Some(ProcessingFailure::from_error(&e));
            }
        }
        self.outcome = None;
        self.flags.insert(AppFlags::REDRAW);
    }

    /// Mark a run as started and hand back the text to analyze. A failed PDF
    /// load from earlier must not hide this run's result.
    pub fn begin_run(&mut self) -> String {
        self.pdf_error = None;
        self.outcome = None;
        self.flags.insert(AppFlags::BUSY);
        self.current_text().to_string()
    }

    /// Run the pipeline off the UI thread, animating the spinner until it finishes.
    async fn analyze(&mut self) -> Result<()> {
        if self.is_busy() {
            return Ok(());
        }
        let text = self.begin_run();
        let config = Arc::clone(&self.config);
        let registry = Arc::clone(&self.registry);
        let (stage_tx, mut stage_rx) = watch::channel(PipelineState::Idle);

        let handle = tokio::task::spawn_blocking(move || {
            let pipeline = Pipeline::new(registry.as_ref(), registry.as_ref(), &config);
            pipeline.analyze_text(&text, &mut |state| {
                debug_trace!("stage {:?}", state);
                let _ = stage_tx.send(state);
            })
        });

        let tick = Duration::from_millis(self.config.ui.tick_ms.max(10));
        while !handle.is_finished() {
            self.stage = *stage_rx.borrow_and_update();
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
            ui_renderer::render(self)?;
            // Input is ignored while a run is in flight
            while event::poll(Duration::ZERO)? {
                let _ = event::read()?;
            }
            tokio::time::sleep(tick).await;
        }

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug_error!("Analysis task failed: {}", e);
                Outcome::Failed(ProcessingFailure::from_error(&anyhow::anyhow!(
                    "analysis task failed: {}",
                    e
                )))
            }
        };
        self.status_message = match &outcome {
            Outcome::Completed(analysis) => format!("Analysis finished in {} ms", analysis.elapsed_ms),
            Outcome::Rejected { .. } => String::new(),
            Outcome::Failed(_) => "Analysis failed".to_string(),
        };
        self.outcome = Some(outcome);
        self.tab = ResultTab::Summary;
        self.stage = PipelineState::Idle;
        self.flags.remove(AppFlags::BUSY);
        self.flags.insert(AppFlags::REDRAW);
        Ok(())
    }

    /// Pick up edits to the config file. Model settings only apply at startup.
    fn poll_config(&mut self) {
        let Some(watch) = &self.config_watch else { return };
        let mut changed = false;
        while let Ok(event) = watch.rx.try_recv() {
            if let Ok(event) = event {
                let touches_file = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == watch.path.file_name());
                if touches_file && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    changed = true;
                }
            }
        }
        if changed {
            let path = watch.path.clone();
            self.reload_config(&path);
        }
    }

    pub fn reload_config(&mut self, path: &Path) {
        match AppConfig::load_from(path) {
            Ok(mut config) => {
                config.apply_env(|key| env::var(key).ok());
                if config.models != self.config.models {
                    debug_log("Model settings changed; they apply on next start");
                    config.models = self.config.models.clone();
                }
                self.config = Arc::new(config);
                self.status_message = "✨ Config reloaded".to_string();
                debug_log(format!("Config reloaded from {}", path.display()));
            }
            Err(e) => {
                debug_error!("Config reload failed: {}", e);
                self.status_message = format!("Config error: {}", e);
            }
        }
        self.flags.insert(AppFlags::REDRAW);
    }
}

fn watch_config(path: &Path) -> Result<ConfigWatch> {
    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    // Editors often replace the file, so watch its directory
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(ConfigWatch { path: path.to_path_buf(), _watcher: watcher, rx })
}

pub async fn run(app: &mut App) -> Result<()> {
    setup_terminal()?;
    let result = run_app(app).await;
    restore_terminal()?;
    result
}

fn setup_terminal() -> Result<()> {
    terminal::enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, Hide, EnableBracketedPaste, EnableMouseCapture)?;
    Ok(())
}

fn restore_terminal() -> Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    execute!(io::stdout(), Show, DisableMouseCapture, DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    Ok(())
}

async fn run_app(app: &mut App) -> Result<()> {
    loop {
        app.poll_config();

        if app.flags.contains(AppFlags::REDRAW) {
            ui_renderer::render(app)?;
            app.flags.remove(AppFlags::REDRAW);
        }
        if app.flags.contains(AppFlags::EXIT) {
            break;
        }

        if event::poll(Duration::from_millis(app.config.ui.tick_ms))? {
            match event::read()? {
                Event::Key(key) => {
                    let action = action_for(&key, app.screen, app.input_mode);
                    app.dispatch(action).await?;
                }
                Event::Paste(text) => app.paste(&text),
                Event::Resize(_, _) => app.flags.insert(AppFlags::REDRAW),
                _ => {}
            }
        } else if app.screen == ScreenMode::Debug {
            // Keep the log view live
            app.flags.insert(AppFlags::REDRAW);
        }
    }
    Ok(())
}
