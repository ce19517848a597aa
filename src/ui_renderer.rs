// Screen renderer for the main and debug screens
use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Stdout, Write};

use crate::analysis::PipelineState;
use crate::app::{App, SPINNER};
use crate::logging;
use crate::screen_mode::{InputMode, ResultTab, ScreenMode};
use crate::theme::SumTopicTheme;
use crate::types::{Analysis, Outcome, ProcessingFailure};

const TITLE: &str = "📝 Text Summarizer & Topic Classifier";
const CAPTION: &str = "Paste text or upload a PDF to get a summary and its topic.";

pub fn render(app: &App) -> Result<()> {
    let mut stdout = io::stdout();
    let (width, height) = terminal::size()?;
    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    match app.screen {
        ScreenMode::Main => render_main(&mut stdout, app, width, height)?,
        ScreenMode::Debug => render_debug(&mut stdout, app, width, height)?,
    }
    render_status_bar(&mut stdout, app, width, height)?;

    queue!(stdout, ResetColor)?;
    stdout.flush()?;
    Ok(())
}

fn put(stdout: &mut Stdout, y: u16, color: Color, text: &str, width: u16) -> Result<()> {
    let clipped: String = text.chars().take(width as usize).collect();
    queue!(stdout, MoveTo(0, y), SetForegroundColor(color), Print(clipped), ResetColor)?;
    Ok(())
}

fn render_header(stdout: &mut Stdout, title: &str, bg: Color, width: u16) -> Result<()> {
    queue!(
        stdout,
        MoveTo(0, 0),
        SetBackgroundColor(bg),
        SetForegroundColor(SumTopicTheme::text_header()),
        SetAttribute(Attribute::Bold),
        Print(format!("  {:<w$}", title, w = (width as usize).saturating_sub(2))),
        SetAttribute(Attribute::Reset),
        ResetColor
    )?;
    Ok(())
}

fn render_main(stdout: &mut Stdout, app: &App, width: u16, height: u16) -> Result<()> {
    let text_width = width.saturating_sub(4).max(10) as usize;
    render_header(stdout, TITLE, SumTopicTheme::accent_header(), width)?;
    put(stdout, 1, SumTopicTheme::text_dim(), &format!("  {}", CAPTION), width)?;

    // Input mode radio
    let radio = |mode: InputMode| {
        let mark = if app.input_mode == mode { "(•)" } else { "( )" };
        format!("{} {}", mark, mode.label())
    };
    queue!(
        stdout,
        MoveTo(0, 3),
        SetForegroundColor(app.config.get_highlight_color()),
        SetAttribute(Attribute::Bold),
        Print("  📥 Input   "),
        SetAttribute(Attribute::Reset),
        SetForegroundColor(SumTopicTheme::text_primary()),
        Print(format!("{}   {}", radio(InputMode::PasteText), radio(InputMode::UploadPdf))),
        SetForegroundColor(SumTopicTheme::text_dim()),
        Print("   [Tab]"),
        ResetColor
    )?;

    let input_height = (height.saturating_sub(16) / 2).clamp(3, 12);
    let mut y = 5;
    match app.input_mode {
        InputMode::PasteText => {
            render_text_box(stdout, app, y, input_height, text_width, width)?;
        }
        InputMode::UploadPdf => {
            let line = match &app.pdf {
                Some(pdf) => format!("  📄 {}  ({})", pdf.name, pdf.path.display()),
                None => "  Press Enter to choose a PDF file".to_string(),
            };
            put(stdout, y, SumTopicTheme::text_secondary(), &line, width)?;
        }
    }
    y += input_height + 1;

    if let Some(stats) = app.current_stats() {
        put(
            stdout,
            y,
            SumTopicTheme::accent_text(),
            &format!("  Word Count: {}    Character Count: {}", stats.words, stats.chars),
            width,
        )?;
    }
    y += 1;
    put(stdout, y, SumTopicTheme::text_dim(), &"─".repeat(width as usize), width)?;
    y += 1;

    if app.is_busy() {
        let stage = match app.stage {
            PipelineState::Idle => PipelineState::Validating.label(),
            other => other.label(),
        };
        put(
            stdout,
            y,
            SumTopicTheme::warning(),
            &format!("  {} Summarizing and classifying... ({})", SPINNER[app.spinner_frame % SPINNER.len()], stage),
            width,
        )?;
    } else {
        put(stdout, y, SumTopicTheme::success(), "  🚀 Analyze Text  [F5]", width)?;
    }
    y += 2;

    let results_bottom = height.saturating_sub(2);
    if app.input_mode == InputMode::UploadPdf {
        if let Some(failure) = &app.pdf_error {
            render_failure(stdout, failure, y, text_width, width)?;
            return Ok(());
        }
    }
    match &app.outcome {
        Some(Outcome::Completed(analysis)) => {
            render_results(stdout, app.tab, analysis, y, results_bottom, text_width, width)?;
        }
        Some(Outcome::Rejected { message, .. }) => {
            put(stdout, y, SumTopicTheme::warning(), &format!("  ⚠ {}", message), width)?;
        }
        Some(Outcome::Failed(failure)) => {
            render_failure(stdout, failure, y, text_width, width)?;
        }
        None => {}
    }
    Ok(())
}

fn render_text_box(
    stdout: &mut Stdout,
    app: &App,
    top: u16,
    rows: u16,
    text_width: usize,
    width: u16,
) -> Result<()> {
    if app.buffer.text().is_empty() {
        return put(stdout, top, SumTopicTheme::text_dim(), "  Enter your text here... (paste with your terminal)", width);
    }
    let mut lines = wrap_text(app.buffer.text(), text_width);
    // Cursor marker at the end of the text
    if let Some(last) = lines.last_mut() {
        last.push('▏');
    }
    let skip = lines.len().saturating_sub(rows as usize);
    for (i, line) in lines.iter().skip(skip).enumerate() {
        put(stdout, top + i as u16, SumTopicTheme::text_primary(), &format!("  {}", line), width)?;
    }
    Ok(())
}

fn render_failure(
    stdout: &mut Stdout,
    failure: &ProcessingFailure,
    top: u16,
    text_width: usize,
    width: u16,
) -> Result<()> {
    put(stdout, top, SumTopicTheme::error(), &format!("  ❌ {}", failure.message), width)?;
    for (i, line) in wrap_text(&failure.detail, text_width).iter().take(4).enumerate() {
        put(stdout, top + 1 + i as u16, SumTopicTheme::text_dim(), &format!("  {}", line), width)?;
    }
    Ok(())
}

fn render_results(
    stdout: &mut Stdout,
    tab: ResultTab,
    analysis: &Analysis,
    top: u16,
    bottom: u16,
    text_width: usize,
    width: u16,
) -> Result<()> {
    queue!(stdout, MoveTo(0, top), Print("  "))?;
    for candidate in [ResultTab::Summary, ResultTab::Topic] {
        if candidate == tab {
            queue!(
                stdout,
                SetBackgroundColor(SumTopicTheme::accent_header()),
                SetForegroundColor(SumTopicTheme::text_header()),
                Print(format!(" {} ", candidate.title())),
                ResetColor,
                Print("  ")
            )?;
        } else {
            queue!(
                stdout,
                SetForegroundColor(SumTopicTheme::text_secondary()),
                Print(format!(" {} ", candidate.title())),
                ResetColor,
                Print("  ")
            )?;
        }
    }

    let mut y = top + 2;
    match tab {
        ResultTab::Summary => {
            let lines = wrap_text(&analysis.summary.text, text_width);
            let room = bottom.saturating_sub(y + 2) as usize;
            for line in lines.iter().take(room) {
                put(stdout, y, SumTopicTheme::text_primary(), &format!("  {}", line), width)?;
                y += 1;
            }
            y += 1;
            put(
                stdout,
                y,
                SumTopicTheme::text_dim(),
                &format!("  Summary length: {} words", analysis.summary.words),
                width,
            )?;
        }
        ResultTab::Topic => {
            queue!(
                stdout,
                MoveTo(2, y),
                SetForegroundColor(SumTopicTheme::accent_text()),
                SetAttribute(Attribute::Bold),
                Print(&analysis.topic.label),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
            let bar_width = text_width.min(50);
            let filled = gauge_filled(analysis.topic.gauge_fraction(), bar_width);
            queue!(
                stdout,
                MoveTo(2, y + 2),
                SetForegroundColor(SumTopicTheme::success()),
                Print("█".repeat(filled)),
                SetForegroundColor(SumTopicTheme::gauge_empty()),
                Print("░".repeat(bar_width - filled)),
                ResetColor
            )?;
            put(
                stdout,
                y + 3,
                SumTopicTheme::text_secondary(),
                &format!("  {}", analysis.topic.score_caption()),
                width,
            )?;
        }
    }
    Ok(())
}

fn render_debug(stdout: &mut Stdout, app: &App, width: u16, height: u16) -> Result<()> {
    render_header(stdout, "🐛 Debug Log", SumTopicTheme::accent_debug(), width)?;
    let logs = logging::snapshot();
    let rows = height.saturating_sub(3) as usize;
    let end = logs.len().saturating_sub(app.debug_scroll);
    let start = end.saturating_sub(rows);
    for (i, line) in logs[start..end].iter().enumerate() {
        let color = if line.contains("ERROR:") {
            SumTopicTheme::error()
        } else if line.contains("TIMING:") {
            SumTopicTheme::accent_text()
        } else {
            SumTopicTheme::text_secondary()
        };
        put(stdout, 2 + i as u16, color, line, width)?;
    }
    Ok(())
}

fn render_status_bar(stdout: &mut Stdout, app: &App, width: u16, height: u16) -> Result<()> {
    let hints = match app.screen {
        ScreenMode::Debug => "Esc/F12 Back  ↑/↓ PgUp/PgDn Scroll  Ctrl+Q Quit",
        ScreenMode::Main => match app.input_mode {
            InputMode::PasteText => "F5 Analyze  Tab Mode  ←/→ Results  Ctrl+U Clear  F12 Debug  Ctrl+Q Quit",
            InputMode::UploadPdf => "Enter Choose PDF  Del Clear  F5 Analyze  Tab Mode  F12 Debug  Ctrl+Q Quit",
        },
    };
    let line = if app.status_message.is_empty() {
        format!(" {}", hints)
    } else {
        format!(" {}  │  {}", hints, app.status_message)
    };
    let padded: String = format!("{:<w$}", line, w = width as usize)
        .chars()
        .take(width as usize)
        .collect();
    queue!(
        stdout,
        MoveTo(0, height.saturating_sub(1)),
        SetBackgroundColor(SumTopicTheme::bg_status_dark()),
        SetForegroundColor(SumTopicTheme::text_status_dark()),
        Print(padded),
        ResetColor
    )?;
    Ok(())
}

/// Number of filled cells for a gauge `width` cells wide.
pub fn gauge_filled(fraction: f32, width: usize) -> usize {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    ((fraction * width as f32).round() as usize).min(width)
}

/// Greedy word wrap that keeps explicit line breaks and splits over-long words.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(word.drain(..width).collect());
            }
            if word.is_empty() {
                continue;
            }
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        lines.push(line);
    }
    lines
}
