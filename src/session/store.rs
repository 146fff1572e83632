//! Session Store - keeps a form session across restarts as a JSON file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::FormSession;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, session: &FormSession) -> Result<()> {
        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;

        Ok(())
    }

    /// A missing file is a fresh session, not an error.
    pub async fn load(&self) -> Result<Option<FormSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read session file")?;

        let session = serde_json::from_str(&json).context("Failed to deserialize session")?;

        Ok(Some(session))
    }

    pub async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}
