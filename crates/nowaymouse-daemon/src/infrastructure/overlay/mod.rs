//! Overlay renderer adapters.
//!
//! - [`UnixSocketOverlay`] delivers one protocol line per connection to the
//!   renderer's Unix socket.
//! - [`process`] launches the renderer and owns its process group.
//! - [`mock`] records lines for tests.

pub mod mock;
#[cfg(target_os = "linux")]
pub mod process;

use std::path::{Path, PathBuf};

use crate::application::overlay_sync::{OverlayError, OverlayNotifier};

/// Sends each line on a freshly opened stream connection, then closes it.
///
/// No acknowledgement is read.  The line is written without a terminator; the
/// renderer reads until EOF.
pub struct UnixSocketOverlay {
    path: PathBuf,
}

impl UnixSocketOverlay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
impl OverlayNotifier for UnixSocketOverlay {
    fn send(&self, line: &str) -> Result<(), OverlayError> {
        use std::io::Write;
        use std::os::unix::net::UnixStream;

        let mut stream = UnixStream::connect(&self.path).map_err(|source| OverlayError::Connect {
            path: self.path.clone(),
            source,
        })?;
        stream
            .write_all(line.as_bytes())
            .map_err(|source| OverlayError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
