use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Leveled logger writing to the console and optionally to a file
///
/// Clones share the same file handle, so the engine and the driver can each
/// hold one.
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    log_file: Option<Arc<Mutex<std::fs::File>>>,
    console_output: bool,
}

impl Logger {
    /// Creates a new logger with console output only
    pub fn new(min_level: LogLevel) -> Self {
        Logger {
            min_level,
            log_file: None,
            console_output: true,
        }
    }

    /// Creates a new logger with both console and file output
    pub fn with_file(min_level: LogLevel, file_path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        Ok(Logger {
            min_level,
            log_file: Some(Arc::new(Mutex::new(file))),
            console_output: true,
        })
    }

    /// A logger that drops everything
    pub fn silent() -> Self {
        Logger {
            min_level: LogLevel::Error,
            log_file: None,
            console_output: false,
        }
    }

    /// Sets whether console output is enabled
    ///
    /// The terminal UI turns this off while it owns the screen.
    pub fn set_console_output(&mut self, enabled: bool) {
        self.console_output = enabled;
    }

    /// Sets the minimum log level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Whether a message at `level` would go anywhere
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level && (self.console_output || self.log_file.is_some())
    }

    fn format_line(level: LogLevel, message: &str) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!("[{}] [{}] {}", timestamp, level, message)
    }

    /// Internal method to log a message
    fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let formatted = Self::format_line(level, message);

        if self.console_output {
            println!("{}", formatted);
        }

        if let Some(file) = &self.log_file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{}", formatted);
            }
        }
    }

    /// Log a debug message
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log an info message
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a warning message
    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    /// Log an error message
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(LogLevel::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_logger_default() {
        let logger = Logger::default();
        assert_eq!(logger.min_level(), LogLevel::Info);
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.enabled(LogLevel::Error));
    }

    #[test]
    fn test_silent_logger_is_disabled() {
        let logger = Logger::silent();
        assert!(!logger.enabled(LogLevel::Error));
    }

    #[test]
    fn test_file_logger_filters_and_appends() {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("supermarketsim_log_{}.log", timestamp));

        let mut logger = Logger::with_file(LogLevel::Info, path.to_str().unwrap()).unwrap();
        logger.set_console_output(false);
        let shared = logger.clone();

        logger.debug("hidden");
        logger.info("opened store");
        shared.error("register jammed");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("hidden"));
        assert!(contents.contains("[INFO] opened store"));
        assert!(contents.contains("[ERROR] register jammed"));
        assert_eq!(contents.lines().count(), 2);

        let _ = std::fs::remove_file(path);
    }
}
