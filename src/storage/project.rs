//! Project management
//!
//! Handles project initialization and picks the configured backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{BackendKind, Config, WIKI_DIR};
use super::{AutosaveOptions, Backend, Coordinator, FileBackend, SqliteBackend};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a wiki project. Run 'wiki init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# Wiki store configuration

[storage]
# "file" keeps the wiki in a JSON file, "sqlite" in a single-row table
backend = "file"
data_file = "wiki.json"
database = "wiki.db"

[autosave]
# Quiet period before edits are written
debounce_ms = 2000
"#;

const GITIGNORE: &str = r#"# SQLite side files
*.db-wal
*.db-shm

# Interrupted writes and write locks
*.tmp
*.lock
"#;

/// A wiki project: a directory holding `.wiki/`
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(WIKI_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let wiki_dir = root.join(WIKI_DIR);

        fs::create_dir_all(&wiki_dir)
            .with_context(|| format!("Failed to create .wiki directory: {}", wiki_dir.display()))?;

        let config_path = wiki_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = wiki_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .wiki directory path
    pub fn wiki_dir(&self) -> PathBuf {
        self.root.join(WIKI_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the configured backend keeps its data
    pub fn data_path(&self) -> PathBuf {
        let storage = &self.config.project.storage;
        match storage.backend {
            BackendKind::File => self.wiki_dir().join(&storage.data_file),
            BackendKind::Sqlite => self.wiki_dir().join(&storage.database),
        }
    }

    /// Opens the configured backend
    pub fn backend(&self) -> Result<Arc<dyn Backend>> {
        let path = self.data_path();
        let backend: Arc<dyn Backend> = match self.config.project.storage.backend {
            BackendKind::File => Arc::new(FileBackend::new(path)),
            BackendKind::Sqlite => Arc::new(
                SqliteBackend::open(&path)
                    .with_context(|| format!("Failed to open database: {}", path.display()))?,
            ),
        };
        Ok(backend)
    }

    pub fn autosave_options(&self) -> AutosaveOptions {
        self.config.project.autosave.options()
    }

    /// Coordinator over the configured backend (not yet loaded)
    pub fn coordinator(&self) -> Result<Coordinator> {
        Ok(Coordinator::new(self.backend()?, self.autosave_options()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.wiki_dir().is_dir());
        assert!(project.wiki_dir().join("config.toml").is_file());
        assert!(project.wiki_dir().join(".gitignore").is_file());
    }

    #[test]
    fn default_config_file_parses() {
        let config: crate::storage::config::ProjectConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Default::default());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(dir.path().join(WIKI_DIR).join("config.toml"), "[storage]\nbackend = \"sqlite\"\n")
            .unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().project.storage.backend, BackendKind::Sqlite);
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Project::open(dir.path()).is_err());
    }

    #[test]
    fn data_path_follows_backend() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        assert!(project.data_path().ends_with(".wiki/wiki.json"));

        fs::write(dir.path().join(WIKI_DIR).join("config.toml"), "[storage]\nbackend = \"sqlite\"\n")
            .unwrap();
        let project = Project::open(dir.path()).unwrap();
        assert!(project.data_path().ends_with(".wiki/wiki.db"));
    }

    #[tokio::test]
    async fn sqlite_backend_is_selected() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();
        fs::write(dir.path().join(WIKI_DIR).join("config.toml"), "[storage]\nbackend = \"sqlite\"\n")
            .unwrap();

        let project = Project::open(dir.path()).unwrap();
        let backend = project.backend().unwrap();
        assert!(backend.describe().starts_with("sqlite"));
        assert!(backend.read().await.unwrap().is_none());
    }
}
