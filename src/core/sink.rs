//! Log sink contract and console implementation.
//!
//! The engine reports every outcome through a four-method [`LogSink`]; the
//! host decides where the lines go. [`ConsoleSink`] prints them with the
//! standard CLI styling and mirrors them to the `log` facade so `--debug`
//! runs capture a full trace.

use colored::*;

/// Destination for engine events. Implementations must be safe to share
/// across operator threads.
pub trait LogSink: Send + Sync {
    fn log_info(&self, message: &str);
    fn log_warning(&self, message: &str);
    fn log_error(&self, message: &str);
    fn log_success(&self, message: &str);
}

/// Colored console sink for the CLI host.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log_info(&self, message: &str) {
        log::info!("{message}");
        println!("{}", message.white());
    }

    fn log_warning(&self, message: &str) {
        log::warn!("{message}");
        println!("{} {}", "! Warning:".yellow(), message.white());
    }

    fn log_error(&self, message: &str) {
        log::error!("{message}");
        println!("{} {}", "✕ Error:".red(), message.white());
    }

    fn log_success(&self, message: &str) {
        log::info!("{message}");
        println!("{} {}", "✓".green(), message.white());
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_sink_does_not_panic() {
        let sink = ConsoleSink;
        sink.log_info("refreshing 3 checkouts");
        sink.log_warning("manual checkout skipped");
        sink.log_error("fetch failed");
        sink.log_success("updated to abc1234");
    }
}
