//! In-memory storage implementation.

use super::{BoxFuture, Project, ProjectStore, StorageError, StorageResult, UserId, sort_projects};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory project store for testing and local-only use.
#[derive(Default)]
pub struct MemoryStorage {
    projects: RwLock<HashMap<String, Project>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl ProjectStore for MemoryStorage {
    fn create_project(&self, owner: &UserId, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            owner: owner.clone(),
            title: title.to_string(),
            content: content.to_string(),
        };
        Box::pin(async move {
            let mut projects = self.projects.write().map_err(lock_error)?;
            projects.insert(project.id.clone(), project.clone());
            log::info!("Created project {} ({})", project.id, project.title);
            Ok(project)
        })
    }

    fn get_project(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let id = id.to_string();
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            projects.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn update_project(&self, id: &str, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>> {
        let id = id.to_string();
        let title = title.to_string();
        let content = content.to_string();
        Box::pin(async move {
            let mut projects = self.projects.write().map_err(lock_error)?;
            let project = projects.get_mut(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            project.title = title;
            project.content = content;
            Ok(project.clone())
        })
    }

    fn delete_project(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut projects = self.projects.write().map_err(lock_error)?;
            projects.remove(&id);
            Ok(())
        })
    }

    fn list_projects(&self, owner: &UserId) -> BoxFuture<'_, StorageResult<Vec<Project>>> {
        let owner = owner.clone();
        Box::pin(async move {
            let projects = self.projects.read().map_err(lock_error)?;
            let mut owned: Vec<Project> = projects.values().filter(|p| p.owner == owner).cloned().collect();
            sort_projects(&mut owned);
            Ok(owned)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_create_and_get() {
        let storage = MemoryStorage::new();
        let owner = UserId::from("ada");

        let created = block_on(storage.create_project(&owner, "Deck", "{}")).unwrap();
        let loaded = block_on(storage.get_project(&created.id)).unwrap();

        assert_eq!(created, loaded);
        assert_eq!(loaded.owner, owner);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.get_project("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        let result = block_on(storage.update_project("nonexistent", "t", ""));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_update() {
        let storage = MemoryStorage::new();
        let created = block_on(storage.create_project(&"ada".into(), "Draft", "")).unwrap();

        let updated = block_on(storage.update_project(&created.id, "Final", "{\"nodes\":[]}")).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Final");
        assert_eq!(block_on(storage.get_project(&created.id)).unwrap().content, "{\"nodes\":[]}");
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();
        let created = block_on(storage.create_project(&"ada".into(), "Deck", "")).unwrap();

        block_on(storage.delete_project(&created.id)).unwrap();
        assert!(block_on(storage.get_project(&created.id)).is_err());
        block_on(storage.delete_project(&created.id)).unwrap();
    }

    #[test]
    fn test_list_by_owner() {
        let storage = MemoryStorage::new();
        let ada = UserId::from("ada");
        block_on(storage.create_project(&ada, "Zebra", "")).unwrap();
        block_on(storage.create_project(&ada, "Apple", "")).unwrap();
        block_on(storage.create_project(&"bob".into(), "Other", "")).unwrap();

        let titles: Vec<String> = block_on(storage.list_projects(&ada))
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Apple", "Zebra"]);
    }
}
