//! Storage initialization
//!
//! Seeds the category registry on first run

use tracing::info;

use crate::error::FintrackResult;
use crate::models::Category;

use super::{Repository, Storage};

const DEFAULT_EXPENSE_CATEGORIES: [(&str, &str, &str); 6] = [
    ("Food & Dining", "#FF6B6B", "restaurant"),
    ("Transportation", "#4ECDC4", "directions_car"),
    ("Shopping", "#45B7D1", "shopping_cart"),
    ("Entertainment", "#96CEB4", "movie"),
    ("Bills & Utilities", "#FFEAA7", "receipt"),
    ("Healthcare", "#DDA0DD", "local_hospital"),
];

const DEFAULT_INCOME_CATEGORIES: [(&str, &str, &str); 3] = [
    ("Salary", "#2ECC71", "work"),
    ("Freelance", "#3498DB", "laptop"),
    ("Investments", "#9B59B6", "trending_up"),
];

/// Check if the category registry is still empty
pub fn needs_initialization(storage: &Storage) -> FintrackResult<bool> {
    Ok(storage.categories.count()? == 0)
}

/// Seed the default categories on an empty registry and save them.
/// Returns the number of categories created; existing data is left alone.
pub fn initialize_storage(storage: &Storage) -> FintrackResult<usize> {
    if !needs_initialization(storage)? {
        return Ok(0);
    }

    let expenses = DEFAULT_EXPENSE_CATEGORIES
        .iter()
        .map(|(name, color, icon)| Category::expense(*name).with_style(*color, *icon));
    let incomes = DEFAULT_INCOME_CATEGORIES
        .iter()
        .map(|(name, color, icon)| Category::income(*name).with_style(*color, *icon));

    let mut created = 0;
    for category in expenses.chain(incomes) {
        storage.categories.insert(category)?;
        created += 1;
    }
    storage.categories.save()?;

    info!(created, "seeded default categories");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FintrackPaths;
    use crate::models::FlowKind;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let storage = Storage::in_memory();
        assert!(needs_initialization(&storage).unwrap());

        assert_eq!(initialize_storage(&storage).unwrap(), 9);
        assert!(!needs_initialization(&storage).unwrap());

        let all = storage.categories.get_all().unwrap();
        let expenses = all.iter().filter(|c| c.kind == FlowKind::Expense).count();
        assert_eq!(expenses, 6);
        assert!(all.iter().any(|c| c.name == "Bills & Utilities"));
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let storage = Storage::in_memory();
        storage
            .categories
            .insert(Category::expense("Custom"))
            .unwrap();

        assert_eq!(initialize_storage(&storage).unwrap(), 0);
        assert_eq!(storage.categories.count().unwrap(), 1);
    }

    #[test]
    fn test_seed_is_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FintrackPaths::with_base_dir(temp_dir.path().to_path_buf());

        let storage = Storage::new(paths.clone()).unwrap();
        initialize_storage(&storage).unwrap();

        let reopened = Storage::new(paths).unwrap();
        reopened.load_all().unwrap();
        assert_eq!(reopened.categories.count().unwrap(), 9);
    }
}
