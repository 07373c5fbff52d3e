/* 📖 # How are log lines routed?

Every line looks like `[MM/dd hh:mm:ss.SSS] [E] message`. The eight levels follow
RFC 5424, from `Emergency` (0) to `Debug` (7). Levels up to `Error` are written
to the error side of a sink, the others to the info side.

Which sink is used depends on the host:
- plain processes, browsers and Cocos print to the console (stderr / stdout)
- editor hosts and Unity have their own log views, fed through `tracing`
- Unreal has no sink yet, lines are dropped

Logging never fails the caller. Write errors are ignored and a panicking
`Display` implementation is caught and the line dropped.
*/

use std::fmt::{self, Display};
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use efx_base::{EfxResult, Environment, RuntimeType, Settings};
use tracing_error::SpanTrace;

use crate::{strings, time};

/// Log severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LevelType {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warn = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl LevelType {
    pub const ALL: [LevelType; 8] = [
        LevelType::Emergency,
        LevelType::Alert,
        LevelType::Critical,
        LevelType::Error,
        LevelType::Warn,
        LevelType::Notice,
        LevelType::Info,
        LevelType::Debug,
    ];

    /// The bracketed one-letter label printed in each line.
    pub fn label(self) -> &'static str {
        match self {
            LevelType::Emergency => "[M]",
            LevelType::Alert => "[A]",
            LevelType::Critical => "[C]",
            LevelType::Error => "[E]",
            LevelType::Warn => "[W]",
            LevelType::Notice => "[N]",
            LevelType::Info => "[I]",
            LevelType::Debug => "[D]",
        }
    }

    /// Parses a level name such as `"warn"`, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let level = match name.trim().to_ascii_lowercase().as_str() {
            "emergency" => LevelType::Emergency,
            "alert" => LevelType::Alert,
            "critical" => LevelType::Critical,
            "error" => LevelType::Error,
            "warn" | "warning" => LevelType::Warn,
            "notice" => LevelType::Notice,
            "info" => LevelType::Info,
            "debug" => LevelType::Debug,
            _ => return None,
        };
        Some(level)
    }

    /// Whether lines of this level go to the error side of a sink.
    pub fn is_error(self) -> bool {
        self <= LevelType::Error
    }
}

/// Destination of formatted log lines.
pub trait LogSink: fmt::Debug + Send + Sync {
    fn write(&self, level: LevelType, line: &str);
}

/// Prints to stderr for error levels and stdout otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, level: LevelType, line: &str) {
        if level.is_error() {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        } else {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        }
    }
}

/// Forwards lines to `tracing` as error or info events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, level: LevelType, line: &str) {
        if level.is_error() {
            tracing::error!(target: "efx", "{}", line);
        } else {
            tracing::info!(target: "efx", "{}", line);
        }
    }
}

/// Drops every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write(&self, _level: LevelType, _line: &str) {}
}

/// Formats one log line.
pub fn format_line(timestamp: &str, level: LevelType, message: &str) -> String {
    format!("[{}] {} {}", timestamp, level.label(), message)
}

/// A sink plus the most verbose level it still prints.
#[derive(Debug, Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    max_level: LevelType,
}

impl Logger {
    pub fn new(sink: impl LogSink + 'static, max_level: LevelType) -> Self {
        Self {
            sink: Arc::new(sink),
            max_level,
        }
    }

    /// The logger matching the host, filtered by `settings.log_level`.
    ///
    /// An unrecognized level name prints everything.
    pub fn for_environment(env: &Environment, settings: &Settings) -> Self {
        let max_level = LevelType::from_name(&settings.log_level).unwrap_or(LevelType::Debug);
        match env.runtime() {
            RuntimeType::Native | RuntimeType::Dom | RuntimeType::Cocos => {
                Self::new(ConsoleSink, max_level)
            }
            RuntimeType::Code | RuntimeType::Unity => Self::new(TracingSink, max_level),
            RuntimeType::Unreal => Self::new(NullSink, max_level),
        }
    }

    pub fn max_level(&self) -> LevelType {
        self.max_level
    }

    pub fn enabled(&self, level: LevelType) -> bool {
        level <= self.max_level
    }

    /// Formats `fmt` with `{0}`-style arguments and writes the line.
    pub fn print(&self, level: LevelType, fmt: &str, args: &[&dyn Display]) {
        if fmt.is_empty() || !self.enabled(level) {
            return;
        }
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let timestamp = time::format_now("MM/dd hh:mm:ss.SSS");
            let message = strings::format(fmt, args);
            self.sink
                .write(level, &format_line(&timestamp, level, &message));
        }));
    }

    /// Reports an error regardless of the level filter, with optional extra text.
    pub fn panic(&self, error: &dyn std::error::Error, extras: Option<&str>) {
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut line = error.to_string();
            if let Some(extras) = extras.filter(|e| !e.is_empty()) {
                line.push(' ');
                line.push_str(extras);
            }
            self.sink.write(LevelType::Emergency, &line);
        }));
    }

    pub fn emergency(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Emergency, fmt, args);
    }

    pub fn alert(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Alert, fmt, args);
    }

    pub fn critical(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Critical, fmt, args);
    }

    pub fn error(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Error, fmt, args);
    }

    pub fn warn(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Warn, fmt, args);
    }

    pub fn notice(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Notice, fmt, args);
    }

    pub fn info(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Info, fmt, args);
    }

    pub fn debug(&self, fmt: &str, args: &[&dyn Display]) {
        self.print(LevelType::Debug, fmt, args);
    }
}

/// The spans active at the call site, one per line.
pub fn trace() -> String {
    SpanTrace::capture().to_string()
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Installs the process-wide logger. Fails if one is already in use.
pub fn install(logger: Logger) -> EfxResult<()> {
    LOGGER
        .set(logger)
        .map_err(|_| efx_base::err!("Logger is already installed"))
}

/// The process-wide logger, chosen from the current environment on first use.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::for_environment(Environment::current(), &Settings::default()))
}

pub fn panic(error: &dyn std::error::Error, extras: Option<&str>) {
    logger().panic(error, extras);
}

pub fn emergency(fmt: &str, args: &[&dyn Display]) {
    logger().emergency(fmt, args);
}

pub fn alert(fmt: &str, args: &[&dyn Display]) {
    logger().alert(fmt, args);
}

pub fn critical(fmt: &str, args: &[&dyn Display]) {
    logger().critical(fmt, args);
}

pub fn error(fmt: &str, args: &[&dyn Display]) {
    logger().error(fmt, args);
}

pub fn warn(fmt: &str, args: &[&dyn Display]) {
    logger().warn(fmt, args);
}

pub fn notice(fmt: &str, args: &[&dyn Display]) {
    logger().notice(fmt, args);
}

pub fn info(fmt: &str, args: &[&dyn Display]) {
    logger().info(fmt, args);
}

pub fn debug(fmt: &str, args: &[&dyn Display]) {
    logger().debug(fmt, args);
}
