// Global debug logger: in-memory ring buffer, optional stderr echo, log file
use chrono::Local;
use once_cell::sync::Lazy;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::config::LoggingConfig;

pub const MAX_DEBUG_LOGS: usize = 1000;

static DEBUG_LOGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));
static LOG_FILE: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));
static ECHO_STDERR: AtomicBool = AtomicBool::new(true);

pub fn init(config: &LoggingConfig) {
    ECHO_STDERR.store(config.echo_stderr, Ordering::Relaxed);
    if let Ok(mut file) = LOG_FILE.lock() {
        *file = config.file.clone();
    }
}

/// The TUI owns the terminal, so it turns the stderr echo off while running.
pub fn set_echo_stderr(enabled: bool) {
    ECHO_STDERR.store(enabled, Ordering::Relaxed);
}

pub fn debug_log<S: Into<String>>(msg: S) {
    let msg = msg.into();
    let formatted_msg = format!("[{}] {}", Local::now().format("%H:%M:%S%.3f"), msg);

    if ECHO_STDERR.load(Ordering::Relaxed) {
        eprintln!("{}", formatted_msg);
    }

    if let Ok(path) = LOG_FILE.lock() {
        if let Some(path) = path.as_ref() {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", formatted_msg);
            }
        }
    }

    if let Ok(mut logs) = DEBUG_LOGS.lock() {
        logs.push(formatted_msg);
        if logs.len() > MAX_DEBUG_LOGS {
            logs.remove(0);
        }
    }
}

pub fn snapshot() -> Vec<String> {
    DEBUG_LOGS.lock().map(|logs| logs.clone()).unwrap_or_default()
}

#[macro_export]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        $crate::logging::debug_log(format!("TRACE: {}", format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! debug_error {
    ($($arg:tt)*) => {
        $crate::logging::debug_log(format!("ERROR: {}", format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! debug_timing {
    ($name:expr, $start:expr) => {
        $crate::logging::debug_log(format!("TIMING: {} took {:?}", $name, $start.elapsed()))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_keeps_latest_entries() {
        set_echo_stderr(false);
        for i in 0..(MAX_DEBUG_LOGS + 5) {
            debug_log(format!("ring-entry-{}", i));
        }
        let logs = snapshot();
        assert!(logs.len() <= MAX_DEBUG_LOGS);
        let newest = format!("ring-entry-{}", MAX_DEBUG_LOGS + 4);
        assert!(logs.iter().any(|line| line.ends_with(&newest)));
        assert!(!logs.iter().any(|line| line.ends_with("ring-entry-0")));
    }

    #[test]
    fn macros_prefix_messages() {
        set_echo_stderr(false);
        crate::debug_error!("boom {}", 7);
        assert!(snapshot().iter().any(|line| line.ends_with("ERROR: boom 7")));
        crate::debug_trace!("stage {:?}", "Summarizing");
        assert!(snapshot().iter().any(|line| line.ends_with("TRACE: stage \"Summarizing\"")));
    }
}
