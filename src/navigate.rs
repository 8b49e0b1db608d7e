//! Navigation side effects.
//!
//! The controller distinguishes replacing the current browsing context from
//! opening a new one. A terminal has no current document, so the system
//! implementation delegates both to the platform URL opener; the distinction
//! stays observable through the controller contract (status text, input
//! clearing) and through this seam in tests.

use tracing::{info, warn};

pub trait Navigator {
    /// Replace the current browsing context with `url`.
    fn replace(&mut self, url: &str);
    /// Open `url` in a new browsing context.
    fn open_new(&mut self, url: &str);
}

/// Opens URLs with the platform default handler. Failures are logged, never
/// propagated - navigation is fire-and-forget from the controller's view.
pub struct SystemNavigator;

impl SystemNavigator {
    fn open(url: &str) {
        info!(url, "navigate");
        if let Err(error) = open::that(url) {
            warn!(url, %error, "open_failed");
        }
    }
}

impl Navigator for SystemNavigator {
    fn replace(&mut self, url: &str) {
        Self::open(url);
    }

    fn open_new(&mut self, url: &str) {
        Self::open(url);
    }
}
