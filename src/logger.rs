//! Per-run log file.
//!
//! [`init`] truncates `FilterLab/filterlab.log` under the platform data
//! directory (`%APPDATA%`, `~/Library/Application Support`, or
//! `$XDG_DATA_HOME` / `~/.local/share`). Setting `FILTERLAB_LOG` to a path
//! sends the log there instead.
//!
//! Lines look like `2026-10-17 08:15:02Z WARN  message`. The `log_info!`,
//! `log_warn!` and `log_err!` macros are usable anywhere in the crate and do
//! nothing until a log has been opened, so library callers need no setup.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

const LOG_ENV: &str = "FILTERLAB_LOG";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Padded so messages line up.
        f.write_str(match self {
            Level::Info => "INFO ",
            Level::Warn => "WARN ",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        })
    }
}

struct SessionLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl SessionLog {
    fn append(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

static SESSION: OnceLock<SessionLog> = OnceLock::new();

/// Path of the open log, if any.
pub fn log_path() -> Option<&'static Path> {
    SESSION.get().map(|s| s.path.as_path())
}

/// Append one record. Silently dropped when no log is open.
pub fn write(level: Level, msg: &str) {
    if let Some(session) = SESSION.get() {
        session.append(&format!("{} {} {}", utc_stamp(now_secs()), level, msg));
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Open the run log at `$FILTERLAB_LOG` or the platform default.
pub fn init() {
    let path = std::env::var_os(LOG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path);
    init_at(&path);
}

/// Open (truncating) the run log at `path` and mirror panics into it.
///
/// The first call that opens a file wins; later calls are ignored. Failing
/// to open the file only prints a notice, the run continues unlogged.
pub fn init_at(path: &Path) {
    if SESSION.get().is_some() {
        return;
    }
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).write(true).truncate(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("warning: no log file ({}): {}", path.display(), e);
            return;
        }
    };
    let session = SessionLog { path: path.to_path_buf(), file: Mutex::new(file) };
    if SESSION.set(session).is_err() {
        // Lost a race with another thread; its file is the log now.
        return;
    }

    write(
        Level::Info,
        &format!("FilterLab {} started, pid {}", env!("CARGO_PKG_VERSION"), std::process::id()),
    );

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write(Level::Panic, &info.to_string());
        prev(info);
    }));
}

fn default_log_path() -> PathBuf {
    data_dir().join("FilterLab").join("filterlab.log")
}

fn data_dir() -> PathBuf {
    let var = |name: &str| std::env::var_os(name).map(PathBuf::from);
    if cfg!(target_os = "windows") {
        if let Some(appdata) = var("APPDATA") {
            return appdata;
        }
    } else if cfg!(target_os = "macos") {
        if let Some(home) = var("HOME") {
            return home.join("Library").join("Application Support");
        }
    } else if let Some(xdg) = var("XDG_DATA_HOME") {
        return xdg;
    }
    var("HOME")
        .map(|h| h.join(".local").join("share"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `YYYY-MM-DD HH:MM:SSZ` for seconds since the Unix epoch.
fn utc_stamp(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (y, m, d) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}Z",
        y,
        m,
        d,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_known_instants() {
        assert_eq!(utc_stamp(0), "1970-01-01 00:00:00Z");
        assert_eq!(utc_stamp(951_782_400), "2000-02-29 00:00:00Z");
        assert_eq!(utc_stamp(1_792_223_702), "2026-10-17 07:55:02Z");
    }

    #[test]
    fn levels_are_aligned() {
        for level in [Level::Info, Level::Warn, Level::Error, Level::Panic] {
            assert_eq!(level.to_string().len(), 5);
        }
    }

    #[test]
    fn session_log_records_tagged_lines() {
        let dir = std::env::temp_dir().join(format!("filterlab-log-{}", std::process::id()));
        let path = dir.join("session.log");
        init_at(&path);
        // Another test may have opened the log first; follow whichever file won.
        let active = log_path().map(Path::to_path_buf).unwrap_or(path);
        crate::log_info!("loaded {} x {}", 4, 3);
        crate::log_err!("boom");
        let text = fs::read_to_string(&active).unwrap();
        assert!(text.contains("INFO  FilterLab"));
        assert!(text.contains("INFO  loaded 4 x 3"));
        assert!(text.contains("ERROR boom"));
    }
}
