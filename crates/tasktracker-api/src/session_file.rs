use std::path::{Path, PathBuf};

use tasktracker_core::{CoreError, SessionStore, SessionToken};

/// Token persisted as a plain file under a single well-known path, surviving
/// restarts until explicit logout or a rejected authenticated call.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<SessionToken>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SessionToken::new(trimmed)))
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CoreError::Persistence(format!(
                "failed to read session token from {}: {err}",
                self.path.display()
            ))),
        }
    }

    fn set(&self, token: &SessionToken) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    CoreError::Persistence(format!(
                        "failed to create session directory {}: {err}",
                        parent.display()
                    ))
                })?;
            }
        }

        std::fs::write(&self.path, token.as_str()).map_err(|err| {
            CoreError::Persistence(format!(
                "failed to write session token to {}: {err}",
                self.path.display()
            ))
        })
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CoreError::Persistence(format!(
                "failed to remove session token at {}: {err}",
                self.path.display()
            ))),
        }
    }
}
