use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind},
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use nucleo::{Config, Nucleo, Utf32String};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::debug_log;
use crate::theme::SumTopicTheme;

const MAX_DEPTH: usize = 4;
const LIST_TOP: u16 = 6;

/// Directories searched for PDFs: the working directory, then Documents and Downloads.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs_list = vec![PathBuf::from(".")];
    dirs_list.extend(dirs::document_dir());
    dirs_list.extend(dirs::download_dir());
    dirs_list
}

/// Use nucleo to pick a PDF file with interactive fuzzy finding.
///
/// Runs inside the caller's raw-mode alternate screen and leaves it in place.
pub fn pick_pdf_file(search_dirs: &[PathBuf]) -> Result<Option<PathBuf>> {
    let pdf_files = find_pdf_files(search_dirs, MAX_DEPTH);
    debug_log(format!("File picker: {} PDF files found", pdf_files.len()));
    run_fuzzy_picker(&pdf_files)
}

fn run_fuzzy_picker(files: &[PathBuf]) -> Result<Option<PathBuf>> {
    let mut stdout = io::stdout();

    let mut nucleo = Nucleo::<Arc<str>>::new(Config::DEFAULT, Arc::new(|| {}), None, 1);
    let injector = nucleo.injector();
    for file in files {
        let file_arc: Arc<str> = Arc::from(file.to_string_lossy().as_ref());
        let _ = injector.push(file_arc, |data, cols: &mut [Utf32String]| {
            cols[0] = data.as_ref().into();
        });
    }

    let mut query = String::new();
    let mut selected_index = 0usize;
    let mut scroll_offset = 0usize;

    loop {
        nucleo.tick(10);
        let (term_width, term_height) = terminal::size().unwrap_or((80, 24));
        let width = term_width as usize;

        queue!(
            stdout,
            Clear(ClearType::All),
            MoveTo(0, 0),
            SetBackgroundColor(SumTopicTheme::accent_header()),
            SetForegroundColor(SumTopicTheme::text_header()),
            SetAttribute(Attribute::Bold),
            Print(format!("  {:<w$}", "📂 Choose a PDF file", w = width.saturating_sub(2))),
            SetAttribute(Attribute::Reset),
            ResetColor,
            MoveTo(0, 3),
            SetForegroundColor(SumTopicTheme::accent_text()),
            Print("  🔍 Search: "),
            SetForegroundColor(SumTopicTheme::text_primary()),
            Print(&query),
            SetForegroundColor(SumTopicTheme::text_dim()),
            Print("_"),
            ResetColor
        )?;

        let snapshot = nucleo.snapshot();
        let all_matches = snapshot.matched_items(..).collect::<Vec<_>>();
        let max_display_items = (term_height as usize).saturating_sub(9).clamp(1, 15);

        if selected_index >= scroll_offset + max_display_items {
            scroll_offset = selected_index + 1 - max_display_items;
        } else if selected_index < scroll_offset {
            scroll_offset = selected_index;
        }

        let visible = all_matches.iter().skip(scroll_offset).take(max_display_items);
        for (display_i, item) in visible.enumerate() {
            let actual_index = scroll_offset + display_i;
            let shown = fit_path(item.data.as_ref(), width.saturating_sub(5));
            queue!(stdout, MoveTo(0, LIST_TOP + display_i as u16))?;
            if actual_index == selected_index {
                queue!(
                    stdout,
                    SetForegroundColor(SumTopicTheme::success()),
                    Print("  ▶ "),
                    SetForegroundColor(SumTopicTheme::text_primary()),
                    Print(shown),
                    ResetColor
                )?;
            } else {
                queue!(
                    stdout,
                    Print("    "),
                    SetForegroundColor(SumTopicTheme::text_secondary()),
                    Print(shown),
                    ResetColor
                )?;
            }
        }

        let help_line = LIST_TOP + max_display_items as u16 + 1;
        let count_line = if all_matches.is_empty() {
            "  No PDF files found".to_string()
        } else if all_matches.len() > max_display_items {
            format!(
                "  Showing {}-{} of {} files",
                scroll_offset + 1,
                (scroll_offset + max_display_items).min(all_matches.len()),
                all_matches.len()
            )
        } else {
            format!("  {} files", all_matches.len())
        };
        queue!(
            stdout,
            MoveTo(0, help_line),
            SetForegroundColor(SumTopicTheme::text_dim()),
            Print(count_line),
            MoveTo(0, help_line + 1),
            Print("  ↑/↓ Navigate  •  Enter Select  •  Esc Back  •  Type to search"),
            ResetColor
        )?;
        stdout.flush()?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let last_index = all_matches.len().saturating_sub(1);
        match event::read()? {
            Event::Key(key) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
                    return Ok(None);
                }
            }
            Event::Key(key) => {
                let mut requery = false;
                match key.code {
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Enter => {
                        if let Some(item) = all_matches.get(selected_index) {
                            return Ok(Some(PathBuf::from(item.data.as_ref())));
                        }
                    }
                    KeyCode::Up => selected_index = selected_index.saturating_sub(1),
                    KeyCode::Down => selected_index = (selected_index + 1).min(last_index),
                    KeyCode::PageUp => selected_index = selected_index.saturating_sub(max_display_items),
                    KeyCode::PageDown => {
                        selected_index = (selected_index + max_display_items).min(last_index)
                    }
                    KeyCode::Home => selected_index = 0,
                    KeyCode::End => selected_index = last_index,
                    KeyCode::Backspace => {
                        query.pop();
                        requery = true;
                    }
                    KeyCode::Char(c) => {
                        query.push(c);
                        requery = true;
                    }
                    _ => {}
                }
                if requery {
                    selected_index = 0;
                    scroll_offset = 0;
                    nucleo.pattern.reparse(
                        0,
                        &query,
                        nucleo::pattern::CaseMatching::Smart,
                        nucleo::pattern::Normalization::Smart,
                        false,
                    );
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => selected_index = selected_index.saturating_sub(3),
                MouseEventKind::ScrollDown => selected_index = (selected_index + 3).min(last_index),
                MouseEventKind::Down(MouseButton::Left) => {
                    let row = mouse.row;
                    if row >= LIST_TOP && row < LIST_TOP + max_display_items as u16 {
                        let clicked = scroll_offset + (row - LIST_TOP) as usize;
                        if clicked < all_matches.len() {
                            selected_index = clicked;
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}

/// Shorten a path to `max_width` chars, preferring to keep the file name.
fn fit_path(path: &str, max_width: usize) -> String {
    if path.chars().count() <= max_width {
        return path.to_string();
    }
    let file_name = path.rsplit('/').next().unwrap_or(path);
    if file_name.chars().count() + 4 <= max_width {
        return format!(".../{}", file_name);
    }
    let keep = max_width.saturating_sub(3);
    format!("{}...", file_name.chars().take(keep).collect::<String>())
}

/// All `*.pdf` files under `search_dirs`, sorted and de-duplicated.
pub fn find_pdf_files(search_dirs: &[PathBuf], max_depth: usize) -> Vec<PathBuf> {
    let mut all_files = Vec::new();
    for dir in search_dirs {
        collect_pdfs(dir, max_depth, &mut all_files);
    }
    all_files.sort();
    all_files.dedup();
    all_files
}

fn collect_pdfs(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let Ok(file_type) = entry.file_type() else { continue };
        if file_type.is_dir() {
            if depth > 0 && !hidden && entry.file_name() != "target" {
                collect_pdfs(&path, depth - 1, out);
            }
        } else if file_type.is_file() && is_pdf_name(&path) {
            out.push(path);
        }
    }
}

fn is_pdf_name(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
