//! Session identity - the opaque token scoping cart rows to one shopper.
//!
//! The cart manager only needs [`SessionProvider::session_id`]. [`Session`] is the
//! stock provider: a UUID v4 that can be persisted to a file so a restarted
//! process keeps talking to the same cart.

use crate::errors::Result;
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Source of the current session identifier.
///
/// Implementations must return the same value for the lifetime of the session.
pub trait SessionProvider: Send + Sync {
    /// The session identifier all cart rows are scoped by.
    fn session_id(&self) -> &str;
}

/// A fixed session identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
}

impl Session {
    /// Starts a fresh session with a random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Wraps an existing identifier.
    #[must_use]
    pub fn from_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Reuses the identifier stored at `path`, or starts a new session and stores it there.
    ///
    /// A missing or blank file counts as no session. Parent directories are created.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, or if the new
    /// identifier cannot be written.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) if !contents.trim().is_empty() => {
                debug!("Reusing persisted session");
                return Ok(Self::from_id(contents.trim()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let session = Self::new();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &session.id)?;
        info!(session_id = %session.id, "Started new session");
        Ok(session)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for Session {
    fn session_id(&self) -> &str {
        &self.id
    }
}
