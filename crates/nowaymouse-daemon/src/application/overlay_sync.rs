//! Keeps the overlay renderer showing the current division state.
//!
//! The channel remembers the last command it was asked to deliver.  Delivery
//! is fire-and-forget; when a `show` fails the channel is marked dirty and the
//! same command is re-sent on the next [`OverlayChannel::resync`], which the
//! router calls at the start of each input event while an overlay may be on
//! screen.  Because each command is a full description of what should be on
//! screen, re-sending is always safe.
//!
//! A failed `hide` is never retried: a renderer that cannot be reached is not
//! drawing anything.

use std::path::PathBuf;
use std::sync::Arc;

use nowaymouse_core::{GridView, OverlayCommand};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for overlay delivery.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("cannot connect to overlay socket {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write to overlay socket {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Delivers one encoded command line to the renderer.
#[cfg_attr(test, mockall::automock)]
pub trait OverlayNotifier: Send + Sync {
    fn send(&self, line: &str) -> Result<(), OverlayError>;
}

pub struct OverlayChannel {
    notifier: Arc<dyn OverlayNotifier>,
    desired: OverlayCommand,
    dirty: bool,
}

impl OverlayChannel {
    pub fn new(notifier: Arc<dyn OverlayNotifier>) -> Self {
        Self {
            notifier,
            desired: OverlayCommand::Hide,
            dirty: false,
        }
    }

    /// Shows the grid for `view`.
    pub fn show(&mut self, view: GridView) {
        self.set(OverlayCommand::show(view));
    }

    /// Hides the overlay.  Always sent, even if already hidden.
    pub fn hide(&mut self) {
        self.set(OverlayCommand::Hide);
    }

    /// Re-sends the desired command if the last delivery failed.
    pub fn resync(&mut self) {
        if self.dirty {
            debug!("re-sending overlay state after failed delivery");
            self.deliver();
        }
    }

    /// The command the renderer should currently be displaying.
    pub fn desired(&self) -> OverlayCommand {
        self.desired
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set(&mut self, command: OverlayCommand) {
        self.desired = command;
        self.deliver();
    }

    fn deliver(&mut self) {
        let line = self.desired.encode();
        match self.notifier.send(&line) {
            Ok(()) => {
                debug!(%line, "overlay updated");
                self.dirty = false;
            }
            Err(e) => {
                warn!("overlay delivery failed: {e}");
                self.dirty = self.desired != OverlayCommand::Hide;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use nowaymouse_core::Point;
    use std::io;

    fn view() -> GridView {
        GridView {
            level: 0,
            origin: Point::ORIGIN,
            area_width: 1000.0,
            area_height: 800.0,
            cols: 2,
            rows: 2,
        }
    }

    fn refused() -> OverlayError {
        OverlayError::Connect {
            path: PathBuf::from("/tmp/overlay.sock"),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        }
    }

    #[test]
    fn test_show_sends_encoded_grid() {
        // Arrange
        let mut notifier = MockOverlayNotifier::new();
        notifier
            .expect_send()
            .with(eq("show,0,0,0,1000,800,2,2"))
            .times(1)
            .returning(|_| Ok(()));
        let mut channel = OverlayChannel::new(Arc::new(notifier));

        // Act
        channel.show(view());

        // Assert
        assert!(!channel.is_dirty());
        assert_eq!(channel.desired(), OverlayCommand::show(view()));
    }

    #[test]
    fn test_hide_is_sent_every_time() {
        let mut notifier = MockOverlayNotifier::new();
        notifier
            .expect_send()
            .with(eq("hide"))
            .times(2)
            .returning(|_| Ok(()));
        let mut channel = OverlayChannel::new(Arc::new(notifier));

        channel.hide();
        channel.hide();
    }

    #[test]
    fn test_failed_delivery_is_retried_on_resync() {
        // Arrange
        let mut seq = Sequence::new();
        let mut notifier = MockOverlayNotifier::new();
        notifier
            .expect_send()
            .with(eq("show,0,0,0,1000,800,2,2"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(refused()));
        notifier
            .expect_send()
            .with(eq("show,0,0,0,1000,800,2,2"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut channel = OverlayChannel::new(Arc::new(notifier));

        // Act
        channel.show(view());
        let dirty_after_failure = channel.is_dirty();
        channel.resync();

        // Assert
        assert!(dirty_after_failure);
        assert!(!channel.is_dirty());
    }

    #[test]
    fn test_failed_hide_is_not_retried() {
        // Arrange
        let mut notifier = MockOverlayNotifier::new();
        notifier
            .expect_send()
            .with(eq("hide"))
            .times(1)
            .returning(|_| Err(refused()));
        let mut channel = OverlayChannel::new(Arc::new(notifier));

        // Act
        channel.hide();
        channel.resync();
        channel.resync();

        // Assert
        assert!(!channel.is_dirty());
        assert_eq!(channel.desired(), OverlayCommand::Hide);
    }

    #[test]
    fn test_resync_when_clean_sends_nothing() {
        let mut notifier = MockOverlayNotifier::new();
        notifier.expect_send().never();
        let mut channel = OverlayChannel::new(Arc::new(notifier));

        channel.resync();
    }

    #[test]
    fn test_newer_state_replaces_failed_one() {
        // A failed show followed by a hide must not resurrect the show.
        let mut seq = Sequence::new();
        let mut notifier = MockOverlayNotifier::new();
        notifier
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(refused()));
        notifier
            .expect_send()
            .with(eq("hide"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut channel = OverlayChannel::new(Arc::new(notifier));

        channel.show(view());
        channel.hide();
        channel.resync();

        assert_eq!(channel.desired(), OverlayCommand::Hide);
        assert!(!channel.is_dirty());
    }
}
