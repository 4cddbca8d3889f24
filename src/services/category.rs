//! Category service
//!
//! CRUD over the category registry. Budgets hold their own copy of the
//! category list, so nothing here reaches into existing budgets.

use chrono::Utc;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{Category, CategoryId, FlowKind, Money};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub name: String,
    pub kind: FlowKind,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub budget_limit: Option<Money>,
}

impl CreateCategoryInput {
    pub fn new(name: impl Into<String>, kind: FlowKind) -> Self {
        Self {
            name: name.into(),
            kind,
            color: None,
            icon: None,
            budget_limit: None,
        }
    }

    pub fn limit(mut self, limit: Money) -> Self {
        self.budget_limit = Some(limit);
        self
    }
}

/// Fields to change on an existing category. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub kind: Option<FlowKind>,
    pub color: Option<String>,
    pub icon: Option<String>,
    /// `Some(None)` clears the limit
    pub budget_limit: Option<Option<Money>>,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateCategoryInput) -> FintrackResult<Category> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(FintrackError::Validation("Category name cannot be empty".into()));
        }

        let _guard = self.storage.lock_categories()?;
        self.ensure_unique_name(name, None)?;

        let mut category = Category::new(name, input.kind);
        if let Some(color) = input.color {
            category.color = color;
        }
        if let Some(icon) = input.icon {
            category.icon = icon;
        }
        category.budget_limit = input.budget_limit;

        category
            .validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.categories.insert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        );

        info!(id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> FintrackResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Exact name lookup, the same match transactions and budgets use
    pub fn find_by_name(&self, name: &str) -> FintrackResult<Option<Category>> {
        Ok(self
            .storage
            .categories
            .get_all()?
            .into_iter()
            .find(|c| c.name == name))
    }

    /// All categories, sorted by name
    pub fn list(&self) -> FintrackResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    pub fn list_by_kind(&self, kind: FlowKind) -> FintrackResult<Vec<Category>> {
        let mut categories = self.list()?;
        categories.retain(|c| c.kind == kind);
        debug!(%kind, count = categories.len(), "listed categories");
        Ok(categories)
    }

    pub fn update(&self, id: CategoryId, patch: CategoryPatch) -> FintrackResult<Category> {
        let _guard = self.storage.lock_categories()?;
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| FintrackError::category_not_found(id.to_string()))?;

        let before = category.clone();

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(FintrackError::Validation("Category name cannot be empty".into()));
            }
            self.ensure_unique_name(name, Some(id))?;
            category.name = name.to_string();
        }
        if let Some(kind) = patch.kind {
            category.kind = kind;
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
        if let Some(icon) = patch.icon {
            category.icon = icon;
        }
        if let Some(limit) = patch.budget_limit {
            category.budget_limit = limit;
        }
        category.updated_at = Utc::now();

        category
            .validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_update(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        );

        info!(id = %category.id, "category updated");
        Ok(category)
    }

    pub fn delete(&self, id: CategoryId) -> FintrackResult<Category> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| FintrackError::category_not_found(id.to_string()))?;

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;

        self.storage.log_delete(
            EntityType::Category,
            id.to_string(),
            Some(category.name.clone()),
            &category,
        );

        info!(%id, name = %category.name, "category deleted");
        Ok(category)
    }

    fn ensure_unique_name(&self, name: &str, except: Option<CategoryId>) -> FintrackResult<()> {
        let lowered = name.to_lowercase();
        let clash = self
            .storage
            .categories
            .get_all()?
            .into_iter()
            .any(|c| Some(c.id) != except && c.name.to_lowercase() == lowered);

        if clash {
            return Err(FintrackError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }
        Ok(())
    }
}
