//! One command's view of the wiki: project, loaded coordinator, flush on close

use anyhow::Result;

use super::output::Output;
use crate::domain::DocumentStore;
use crate::storage::{Coordinator, Project, SyncStatus};

pub struct Session {
    project: Project,
    coordinator: Coordinator,
}

impl Session {
    /// Opens the current project and loads its document, seeding an empty
    /// backend
    pub async fn open(output: &Output) -> Result<Self> {
        let project = Project::open_current()?;
        let coordinator = project.coordinator()?;

        output.verbose_ctx("load", &coordinator.backend().describe());
        coordinator.load().await?;

        Ok(Self {
            project,
            coordinator,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn backend_label(&self) -> String {
        self.coordinator.backend().describe()
    }

    pub fn read<R>(&self, view: impl FnOnce(&DocumentStore) -> R) -> Result<R> {
        Ok(self.coordinator.read(view)?)
    }

    pub fn edit<R>(&self, mutate: impl FnOnce(&mut DocumentStore) -> R) -> Result<R> {
        Ok(self.coordinator.edit(mutate)?)
    }

    pub fn status(&self) -> SyncStatus {
        self.coordinator.status()
    }

    /// Writes pending edits
    pub async fn close(self) -> Result<()> {
        self.coordinator.close().await?;
        Ok(())
    }
}
