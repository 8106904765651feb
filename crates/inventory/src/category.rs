use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, Entity};

/// A category row as persisted by a repository adapter.
///
/// The soft-delete flag lives in storage only; a deleted category is never
/// handed back to the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog category. Carries no invariant beyond its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    id: Option<CategoryId>,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
    pub fn create(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rehydrate(stored: StoredCategory) -> Self {
        Self {
            id: Some(stored.id),
            name: stored.name,
            description: stored.description,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    pub fn to_stored(&self, id: CategoryId) -> StoredCategory {
        StoredCategory {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn update(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.name = name.into();
        self.description = description.into();
        self.updated_at = Utc::now();
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_has_no_identity_yet() {
        let category = Category::create("Tools", "Hand tools");
        assert_eq!(category.id(), None);
        assert_eq!(category.name(), "Tools");
        assert_eq!(category.description(), "Hand tools");
        assert_eq!(category.created_at(), category.updated_at());
    }

    #[test]
    fn update_replaces_name_and_description() {
        let mut category = Category::create("Tools", "Hand tools");
        let created_at = category.created_at();

        category.update("Garden", "Outdoor");

        assert_eq!(category.name(), "Garden");
        assert_eq!(category.description(), "Outdoor");
        assert_eq!(category.created_at(), created_at);
        assert!(category.updated_at() >= created_at);
    }

    #[test]
    fn rehydrate_keeps_the_stored_identity() {
        let stored = Category::create("Tools", "").to_stored(CategoryId::new(4));
        let category = Category::rehydrate(stored.clone());
        assert_eq!(category.id(), Some(CategoryId::new(4)));
        assert_eq!(category.to_stored(CategoryId::new(4)), stored);
    }
}
