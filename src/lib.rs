//! # lecture-runner
//!
//! Unattended completion of required video lectures on the campus e-learning
//! portal. The engine logs in, discovers which lectures are still incomplete,
//! drives each lecture's player to full playback at maximum speed, confirms
//! completion, and mirrors every milestone to a Telegram channel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lecture_runner::{Config, Runner, TelegramNotifier, WebDriverSession};
//!
//! # #[tokio::main]
//! # async fn main() -> lecture_runner::Result<()> {
//! let config = Config::from_env()?;
//! let notifier = TelegramNotifier::new(&config.telegram_token, config.telegram_chat_id);
//! let session = WebDriverSession::connect(&config.webdriver_url, config.headless).await?;
//!
//! let summary = Runner::new(&session, &notifier, &config).run_once().await?;
//! println!("watched {} lectures", summary.lectures_watched);
//!
//! session.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod notify;
pub mod portal;
pub mod retry;
pub mod session;

pub use config::Config;
pub use notify::{Notifier, TelegramNotifier};
pub use portal::model::{Lecture, Subject};
pub use portal::runner::{RunSummary, Runner};
pub use session::webdriver::WebDriverSession;
pub use session::{Selector, Session};

/// Result type for lecture-runner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the portal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// A selector resolved to nothing in the current document/frame context.
    #[error("not found: {0}")]
    NotFound(String),

    /// A previously valid handle is no longer attached to the document.
    #[error("stale element: {0}")]
    Stale(String),

    /// An expected asynchronous UI effect did not occur in time.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Displayed text did not match the expected format.
    #[error("parse failure: {0}")]
    Parse(String),

    /// The page structure or account state no longer matches what the engine
    /// depends on; continuing would be unsafe.
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("webdriver error: {0}")]
    Driver(#[from] thirtyfour::error::WebDriverError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notify error: {0}")]
    Notify(String),
}

impl Error {
    /// True for the class of failures recovered by re-resolving and retrying.
    /// Everything else propagates to the top-level run wrapper.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Stale(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(Error::NotFound("x".into()).is_transient());
        assert!(Error::Stale("x".into()).is_transient());
        assert!(!Error::Timeout("x".into()).is_transient());
        assert!(!Error::Parse("x".into()).is_transient());
        assert!(!Error::Precondition("x".into()).is_transient());
        assert!(!Error::Config("x".into()).is_transient());
    }
}
