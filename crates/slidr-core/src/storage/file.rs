//! File-based storage implementation for native platforms.

use super::{BoxFuture, Project, ProjectStore, StorageError, StorageResult, UserId, sort_projects};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-based project store for native platforms.
///
/// Stores each project as a JSON file in a specified directory.
pub struct FileStorage {
    /// Base directory for project files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the platform data directory.
    ///
    /// On Linux: `~/.local/share/slidr/projects/`
    /// On Windows: `%LOCALAPPDATA%\slidr\projects\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("slidr").join("projects"))
    }

    fn project_path(&self, id: &str) -> PathBuf {
        // Sanitize ID to be safe for filenames
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn read_project(path: &Path) -> StorageResult<Project> {
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn write_project(path: &Path, project: &Project) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(project)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    fs::write(path, json)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

impl ProjectStore for FileStorage {
    fn create_project(&self, owner: &UserId, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            owner: owner.clone(),
            title: title.to_string(),
            content: content.to_string(),
        };
        let path = self.project_path(&project.id);
        Box::pin(async move {
            write_project(&path, &project)?;
            log::info!("Created project {} at {}", project.id, path.display());
            Ok(project)
        })
    }

    fn get_project(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let path = self.project_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            read_project(&path)
        })
    }

    fn update_project(&self, id: &str, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let path = self.project_path(id);
        let id = id.to_string();
        let title = title.to_string();
        let content = content.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let mut project = read_project(&path)?;
            project.title = title;
            project.content = content;
            write_project(&path, &project)?;
            Ok(project)
        })
    }

    fn delete_project(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.project_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list_projects(&self, owner: &UserId) -> BoxFuture<'_, StorageResult<Vec<Project>>> {
        let base = self.base_path.clone();
        let owner = owner.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut projects = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_none_or(|e| e != "json") {
                    continue;
                }
                match read_project(&path) {
                    Ok(project) if project.owner == owner => projects.push(project),
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable project file: {}", e),
                }
            }
            sort_projects(&mut projects);
            Ok(projects)
        })
    }
}
