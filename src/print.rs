//! Leveled printing to the screen and to a log file.
//!
//! A [`Printer`] writes each message to two places, filtered independently:
//! the screen (errors to the error sink, everything else to the output sink)
//! when the print level admits it, and a timestamped log file when the
//! output level admits it. Every call counts toward the error or log
//! counter, whether or not it was shown.
//!
//! On an ANSI terminal a "sticky" line can be pinned below the scrolling
//! output; it is redrawn after every printed message.
//!
//! The `pfatal!`, `perrno!`, `perr!`, `pwarn!`, `plog!` and `pdebug!` macros
//! print through the process-wide printer returned by [`global`].

use std::fmt::{self, Write as _};
use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::OnceLock;

use chrono::Local;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

const CLEAR_RIGHT: &str = "\x1b[K";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintLevel {
    None = 0,
    Fatal = 1,
    Error = 2,
    Warn = 3,
    Log = 4,
    Debug = 5,
}

impl PrintLevel {
    fn is_error(self) -> bool {
        matches!(self, Self::Fatal | Self::Error)
    }
}

impl std::str::FromStr for PrintLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(Self::None),
            "fatal" | "1" => Ok(Self::Fatal),
            "error" | "2" => Ok(Self::Error),
            "warn" | "3" => Ok(Self::Warn),
            "log" | "4" => Ok(Self::Log),
            "debug" | "5" => Ok(Self::Debug),
            other => Err(format!("unknown print level '{}'", other)),
        }
    }
}

type Sink = Box<dyn Write + Send>;

struct Screen {
    out: Sink,
    err: Sink,
    level: PrintLevel,
    ansi: bool,
    sticky: String,
    sticky_lines: usize,
}

struct Output {
    file: Option<Sink>,
    level: PrintLevel,
    errs: u64,
    logs: u64,
}

pub struct Printer {
    screen: Mutex<Screen>,
    output: Mutex<Output>,
}

impl fmt::Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("print_level", &self.print_level())
            .field("output_level", &self.output_level())
            .field("num_errs", &self.num_errs())
            .field("num_logs", &self.num_logs())
            .finish()
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `text`, clearing to the end of the line before every line break
/// that does not follow a carriage return.
fn write_clear(w: &mut dyn Write, text: &str, ansi: bool) -> io::Result<()> {
    if !ansi {
        return w.write_all(text.as_bytes());
    }

    let mut start = 0;
    let mut prev = None;
    for (i, c) in text.char_indices() {
        if i > 0 && (c == '\r' || c == '\n') && prev != Some('\r') {
            w.write_all(text[start..i].as_bytes())?;
            w.write_all(CLEAR_RIGHT.as_bytes())?;
            start = i;
        }
        prev = Some(c);
    }
    w.write_all(text[start..].as_bytes())
}

fn base_name(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

impl Screen {
    fn emit(&mut self, to_err: bool, prefix: &str, msg: &str, suffix: &str) -> io::Result<()> {
        let ansi = self.ansi;
        let sink = if to_err { &mut self.err } else { &mut self.out };
        sink.write_all(prefix.as_bytes())?;
        write_clear(&mut **sink, msg, ansi)?;
        sink.write_all(suffix.as_bytes())?;
        if ansi {
            sink.write_all(CLEAR_RIGHT.as_bytes())?;
        }
        sink.write_all(b"\n")?;
        sink.flush()
    }

    fn render_sticky(&mut self) -> io::Result<()> {
        if self.level == PrintLevel::None || !self.ansi || self.sticky.is_empty() {
            return Ok(());
        }
        let text = format!("\n{}\r", self.sticky);
        write_clear(&mut *self.out, &text, true)?;
        write!(self.out, "\x1b[{}A{}", 1 + self.sticky_lines, CLEAR_RIGHT)?;
        self.out.flush()
    }
}

impl Printer {
    /// A printer on stdout/stderr. ANSI control sequences are used when
    /// stdout is a terminal. Both levels start at [`PrintLevel::None`].
    pub fn new() -> Self {
        let ansi = io::stdout().is_terminal();
        let mut printer = Self::with_sinks(Box::new(io::stdout()), Box::new(io::stderr()));
        printer.screen.get_mut().ansi = ansi;
        printer
    }

    /// A printer writing screen output to `out` and errors to `err`,
    /// without ANSI control sequences.
    pub fn with_sinks(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out,
                err,
                level: PrintLevel::None,
                ansi: false,
                sticky: String::new(),
                sticky_lines: 0,
            }),
            output: Mutex::new(Output {
                file: None,
                level: PrintLevel::None,
                errs: 0,
                logs: 0,
            }),
        }
    }

    pub fn set_ansi(&self, ansi: bool) {
        self.screen.lock().ansi = ansi;
    }

    pub fn set_print_level(&self, level: PrintLevel) {
        self.screen.lock().level = level;
    }

    pub fn print_level(&self) -> PrintLevel {
        self.screen.lock().level
    }

    pub fn set_output_level(&self, level: PrintLevel) {
        self.output.lock().level = level;
    }

    pub fn output_level(&self) -> PrintLevel {
        self.output.lock().level
    }

    /// Logs to `path`, appending or truncating. Any previous log file is
    /// closed first, even if opening the new one fails.
    pub fn set_output_file<P: AsRef<Path>>(&self, path: P, append: bool) -> Result<()> {
        let mut output = self.output.lock();
        output.file = None;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;
        output.file = Some(Box::new(file));
        Ok(())
    }

    pub fn set_output_writer(&self, writer: Box<dyn Write + Send>) {
        self.output.lock().file = Some(writer);
    }

    pub fn close_output(&self) {
        let mut output = self.output.lock();
        if let Some(mut file) = output.file.take() {
            let _ = file.flush();
        }
    }

    pub fn num_errs(&self) -> u64 {
        self.output.lock().errs
    }

    pub fn num_logs(&self) -> u64 {
        self.output.lock().logs
    }

    /// Prints `msg` to the screen regardless of print level.
    pub fn print(&self, msg: &str) {
        let mut screen = self.screen.lock();
        let ansi = screen.ansi;
        let _ = write_clear(&mut *screen.out, msg, ansi).and_then(|_| screen.out.flush());
        let _ = screen.render_sticky();
    }

    /// Pins `msg` below the scrolling output. An empty message clears it.
    pub fn sticky(&self, msg: &str) {
        if msg.is_empty() {
            self.clear_sticky();
            return;
        }
        let mut screen = self.screen.lock();
        screen.sticky = msg.to_string();
        screen.sticky_lines = msg.matches('\n').count();
        let _ = screen.render_sticky();
    }

    pub fn clear_sticky(&self) {
        let mut screen = self.screen.lock();
        if screen.ansi && screen.level != PrintLevel::None && !screen.sticky.is_empty() {
            let lines = screen.sticky_lines;
            let mut erase = String::new();
            for _ in 0..=lines {
                erase.push('\n');
                erase.push_str(CLEAR_RIGHT);
            }
            let _ = write!(erase, "\x1b[{}A", 1 + lines);
            let _ = screen
                .out
                .write_all(erase.as_bytes())
                .and_then(|_| screen.out.flush());
        }
        screen.sticky.clear();
        screen.sticky_lines = 0;
    }

    pub fn sticky_message(&self) -> String {
        self.screen.lock().sticky.clone()
    }

    /// Prints a message at `level`. Returns 2 for fatal, 1 for error and
    /// 0 otherwise.
    ///
    /// Fatal messages carry a `[file:line]` trace. For fatal and error
    /// messages, `errno` appends `": <description>"`.
    pub fn print_ext(
        &self,
        errno: Option<i32>,
        level: PrintLevel,
        line: u32,
        file: &str,
        args: fmt::Arguments<'_>,
    ) -> i32 {
        let code = match level {
            PrintLevel::Fatal => 2,
            PrintLevel::Error => 1,
            _ => 0,
        };

        let mut prefix = String::new();
        let mut suffix = String::new();
        match level {
            PrintLevel::Fatal | PrintLevel::Error => {
                if level == PrintLevel::Fatal {
                    let _ = write!(prefix, "[{}:{}] !!! FATAL ", base_name(file), line);
                }
                prefix.push_str("Error. ");
                if let Some(e) = errno.filter(|e| *e >= 0) {
                    suffix = format!(": {}", strerror_ext(e));
                }
            }
            PrintLevel::Warn => prefix.push_str("Warning... "),
            PrintLevel::Debug => prefix.push_str("DEBUG: "),
            PrintLevel::Log | PrintLevel::None => {}
        }
        let msg = args.to_string();
        let to_err = level.is_error();

        {
            let mut screen = self.screen.lock();
            if screen.level >= level {
                let result = screen
                    .emit(to_err, &prefix, &msg, &suffix)
                    .and_then(|_| screen.render_sticky());
                if let Err(e) = result {
                    tracing::debug!("screen print failed: {}", e);
                }
            }
        }

        let mut output = self.output.lock();
        if output.level >= level {
            if let Some(file) = output.file.as_mut() {
                let stamp = Local::now().format(TIMESTAMP_FORMAT);
                let result = writeln!(file, "{} - {}{}{}", stamp, prefix, msg, suffix)
                    .and_then(|_| file.flush());
                if let Err(e) = result {
                    tracing::debug!("log file write failed: {}", e);
                }
            }
        }
        if to_err {
            output.errs += 1;
        } else {
            output.logs += 1;
        }

        code
    }
}

static GLOBAL: OnceLock<Printer> = OnceLock::new();

/// The process-wide printer used by the print macros.
pub fn global() -> &'static Printer {
    GLOBAL.get_or_init(Printer::new)
}

pub fn set_print_level(level: PrintLevel) {
    global().set_print_level(level);
}

pub fn set_output_level(level: PrintLevel) {
    global().set_output_level(level);
}

pub fn set_output_file<P: AsRef<Path>>(path: P, append: bool) -> Result<()> {
    global().set_output_file(path, append)
}

pub fn close_output() {
    global().close_output();
}

pub fn num_errs() -> u64 {
    global().num_errs()
}

pub fn num_logs() -> u64 {
    global().num_logs()
}

pub fn print(msg: &str) {
    global().print(msg);
}

pub fn sticky(msg: &str) {
    global().sticky(msg);
}

pub fn clear_sticky() {
    global().clear_sticky();
}

/// Describes an error code. Positive codes are OS errno values, negative
/// codes belong to the alternate (platform socket) error space and 0 is
/// success.
pub fn strerror_ext(code: i32) -> String {
    match code {
        0 => "Success".to_string(),
        c if c > 0 => os_error_text(c),
        c => format!("Alternate error {}: {}", c.unsigned_abs(), os_error_text(c.saturating_neg())),
    }
}

fn os_error_text(code: i32) -> String {
    let text = io::Error::from_raw_os_error(code).to_string();
    match text.rfind(" (os error ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

#[macro_export]
macro_rules! pfatal {
    ($($arg:tt)*) => {
        $crate::print::global().print_ext(
            None, $crate::print::PrintLevel::Fatal, line!(), file!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! perrno {
    ($errno:expr, $($arg:tt)*) => {
        $crate::print::global().print_ext(
            Some($errno), $crate::print::PrintLevel::Error, line!(), file!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! perr {
    ($($arg:tt)*) => {
        $crate::print::global().print_ext(
            None, $crate::print::PrintLevel::Error, line!(), file!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! pwarn {
    ($($arg:tt)*) => {
        $crate::print::global().print_ext(
            None, $crate::print::PrintLevel::Warn, line!(), file!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! plog {
    ($($arg:tt)*) => {
        $crate::print::global().print_ext(
            None, $crate::print::PrintLevel::Log, line!(), file!(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! pdebug {
    ($($arg:tt)*) => {
        $crate::print::global().print_ext(
            None, $crate::print::PrintLevel::Debug, line!(), file!(), format_args!($($arg)*))
    };
}
