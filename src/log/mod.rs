use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::utils::hash::{self, StringHash};

// ----------------------------------------------
// Level
// ----------------------------------------------

#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Silent,
    Verbose,
    Info,
    Warn,
    Error,
}

impl Level {
    #[inline]
    pub fn is_enabled(self) -> bool {
        self != Self::Silent && (self as u32) >= MIN_LEVEL.load(Ordering::Relaxed)
    }

    // ANSI escape that starts this level's color; `TTY_RESET` ends it.
    fn tty_escape(self) -> &'static str {
        match self {
            Self::Silent  => "",
            Self::Verbose => "\x1b[90m",
            Self::Info    => "\x1b[32m",
            Self::Warn    => "\x1b[33m",
            Self::Error   => "\x1b[31m",
        }
    }
}

const TTY_RESET: &str = "\x1b[0m";

// ----------------------------------------------
// Channel
// ----------------------------------------------

// Subsystem tag printed after the level, e.g. `[Info] [minimap] ...`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub name: &'static str,
    pub hash: StringHash,
}

impl Channel {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self { name, hash: hash::fnv1a_from_str(name) }
    }
}

impl Hash for Channel {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

#[macro_export]
macro_rules! channel {
    ($name:literal) => { $crate::log::Channel::new(concat!(" [", $name, "]")) };
}

// ----------------------------------------------
// LogConfigs
// ----------------------------------------------

// Logger settings, loaded as part of the application configs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfigs {
    pub level: Level,
    pub source_location: bool,
    pub tty_colors: bool,
}

impl Default for LogConfigs {
    fn default() -> Self {
        Self { level: Level::Info, source_location: false, tty_colors: true }
    }
}

static MIN_LEVEL: AtomicU32 = AtomicU32::new(Level::Info as u32);
static SOURCE_LOCATION: AtomicBool = AtomicBool::new(false);
static TTY_COLORS: AtomicBool = AtomicBool::new(true);

pub fn set_level(level: Level) {
    MIN_LEVEL.store(level as u32, Ordering::Relaxed);
}

pub fn configure(configs: &LogConfigs) {
    set_level(configs.level);
    SOURCE_LOCATION.store(configs.source_location, Ordering::Relaxed);
    TTY_COLORS.store(configs.tty_colors, Ordering::Relaxed);
}

// ----------------------------------------------
// Listener
// ----------------------------------------------

// Copy of a printed log line, handed to the listener.
#[derive(Clone, Debug)]
pub struct Record {
    pub level: Level,
    pub channel: Option<Channel>,
    pub location: Location,
    pub message: String,
}

static LISTENER: OnceLock<Box<dyn Fn(&Record) + Send + Sync>> = OnceLock::new();

// Installs the process-wide listener. Only the first call succeeds.
pub fn set_listener<F>(listener_fn: F) -> bool
    where F: Fn(&Record) + Send + Sync + 'static
{
    LISTENER.set(Box::new(listener_fn)).is_ok()
}

// ----------------------------------------------
// Output
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
    pub module: &'static str,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.module)
    }
}

// One output line without the trailing newline.
pub fn format_line(level: Level,
                   channel: Option<Channel>,
                   location: &Location,
                   message: &str,
                   source_location: bool,
                   tty_colors: bool) -> String {
    let chan_name = channel.map(|chan| chan.name).unwrap_or_default();
    let (escape, reset) = if tty_colors { (level.tty_escape(), TTY_RESET) } else { ("", "") };

    if source_location {
        format!("{escape}[{level:?}]{chan_name}{reset} {location} - {message}")
    } else {
        format!("{escape}[{level:?}]{chan_name}{reset} {message}")
    }
}

pub fn print_internal(level: Level, channel: Option<Channel>, location: &Location, args: fmt::Arguments) {
    if !level.is_enabled() {
        return;
    }

    let message = args.to_string();
    let line = format_line(level, channel, location, &message,
                           SOURCE_LOCATION.load(Ordering::Relaxed),
                           TTY_COLORS.load(Ordering::Relaxed));

    // Errors go to stderr. A failed write has nowhere to be reported.
    let _ = if level == Level::Error {
        writeln!(std::io::stderr().lock(), "{line}")
    } else {
        writeln!(std::io::stdout().lock(), "{line}")
    };

    if let Some(listener) = LISTENER.get() {
        listener(&Record { level, channel, location: *location, message });
    }
}

#[macro_export]
macro_rules! log_message {
    ($level:expr, $chan:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        if $level.is_enabled() {
            $crate::log::print_internal(
                $level,
                $chan,
                &$crate::log::Location { file: file!(), line: line!(), module: module_path!() },
                format_args!($fmt $(, $($arg)+)?)
            );
        }
    };
}

// ----------------------------------------------
// Macros
// ----------------------------------------------

#[macro_export]
macro_rules! verbose {
    ($fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Verbose, None, $fmt $(, $($arg)+)?)
    };
    ($chan:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Verbose, Some($chan), $fmt $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! info {
    ($fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Info, None, $fmt $(, $($arg)+)?)
    };
    ($chan:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Info, Some($chan), $fmt $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! warn {
    ($fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Warn, None, $fmt $(, $($arg)+)?)
    };
    ($chan:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Warn, Some($chan), $fmt $(, $($arg)+)?)
    };
}

#[macro_export]
macro_rules! error {
    ($fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Error, None, $fmt $(, $($arg)+)?)
    };
    ($chan:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        $crate::log_message!($crate::log::Level::Error, Some($chan), $fmt $(, $($arg)+)?)
    };
}

// Scoped usage: log::info!(), log::warn!(), etc.
#[allow(unused_imports)]
pub use crate::{channel, verbose, info, warn, error};
