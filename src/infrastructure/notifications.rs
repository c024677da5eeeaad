//! User-visible notices for the command line.

use crate::domain::ports::NotificationPort;

/// Prints notices to stdout and mirrors them into the log.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotificationService {
    enabled: bool,
}

impl ConsoleNotificationService {
    /// Creates the service. A disabled service only logs.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl NotificationPort for ConsoleNotificationService {
    fn send(&self, title: &str, body: &str) {
        tracing::info!(%title, "{body}");
        if self.enabled {
            println!("{title}: {body}");
        }
    }
}
