//! Savings goal service

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::audit::EntityType;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{GoalId, Money, SavingsGoal};
use crate::storage::Storage;

/// Service for savings goal management
pub struct GoalService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new goal
#[derive(Debug, Clone)]
pub struct CreateGoalInput {
    pub name: String,
    pub target_amount: Money,
    pub current_amount: Option<Money>,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
}

impl CreateGoalInput {
    pub fn new(name: impl Into<String>, target_amount: Money) -> Self {
        Self {
            name: name.into(),
            target_amount,
            current_amount: None,
            deadline: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<Money>,
    pub current_amount: Option<Money>,
    /// `Some(None)` removes the deadline
    pub deadline: Option<Option<NaiveDate>>,
    pub category: Option<String>,
}

/// Progress across every goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalsOverview {
    pub total_target: Money,
    pub total_saved: Money,
    pub completed: usize,
    /// `total_saved / total_target * 100`, zero without targets
    pub progress_percent: f64,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateGoalInput) -> FintrackResult<SavingsGoal> {
        let mut goal = SavingsGoal::new(input.name.trim(), input.target_amount);
        goal.current_amount = input.current_amount.unwrap_or_default();
        goal.deadline = input.deadline;
        if let Some(category) = input.category {
            goal.category = category;
        }

        goal.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.goals.insert(goal.clone())?;
        self.storage.goals.save()?;

        self.storage.log_create(
            EntityType::SavingsGoal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &goal,
        );

        info!(id = %goal.id, name = %goal.name, "savings goal created");
        Ok(goal)
    }

    pub fn get(&self, id: GoalId) -> FintrackResult<Option<SavingsGoal>> {
        self.storage.goals.get(id)
    }

    /// Oldest first
    pub fn list(&self) -> FintrackResult<Vec<SavingsGoal>> {
        self.storage.goals.get_all()
    }

    pub fn update(&self, id: GoalId, patch: GoalPatch) -> FintrackResult<SavingsGoal> {
        let before = self.require(id)?;
        let mut goal = before.clone();

        if let Some(name) = patch.name {
            goal.name = name.trim().to_string();
        }
        if let Some(target) = patch.target_amount {
            goal.target_amount = target;
        }
        if let Some(current) = patch.current_amount {
            goal.current_amount = current;
        }
        if let Some(deadline) = patch.deadline {
            goal.deadline = deadline;
        }
        if let Some(category) = patch.category {
            goal.category = category;
        }
        goal.updated_at = Utc::now();

        self.write_update(&before, goal)
    }

    /// Add a contribution to the saved amount
    pub fn add_to_goal(&self, id: GoalId, amount: Money) -> FintrackResult<SavingsGoal> {
        if !amount.is_positive() {
            return Err(FintrackError::Validation(
                "Contribution must be greater than 0".into(),
            ));
        }

        let before = self.require(id)?;
        let mut goal = before.clone();
        goal.contribute(amount);

        self.write_update(&before, goal)
    }

    pub fn delete(&self, id: GoalId) -> FintrackResult<SavingsGoal> {
        let goal = self.require(id)?;

        self.storage.goals.delete(id)?;
        self.storage.goals.save()?;

        self.storage.log_delete(
            EntityType::SavingsGoal,
            id.to_string(),
            Some(goal.name.clone()),
            &goal,
        );

        info!(%id, "savings goal deleted");
        Ok(goal)
    }

    pub fn overview(&self) -> FintrackResult<GoalsOverview> {
        Ok(overview_of(&self.list()?))
    }

    fn require(&self, id: GoalId) -> FintrackResult<SavingsGoal> {
        self.storage
            .goals
            .get(id)?
            .ok_or_else(|| FintrackError::goal_not_found(id.to_string()))
    }

    fn write_update(&self, before: &SavingsGoal, goal: SavingsGoal) -> FintrackResult<SavingsGoal> {
        goal.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;

        self.storage.log_update(
            EntityType::SavingsGoal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            before,
            &goal,
        );

        info!(id = %goal.id, saved = %goal.current_amount, "savings goal updated");
        Ok(goal)
    }
}

/// Aggregate progress over a set of goals
pub fn overview_of(goals: &[SavingsGoal]) -> GoalsOverview {
    let total_target: Money = goals.iter().map(|g| g.target_amount).sum();
    let total_saved: Money = goals.iter().map(|g| g.current_amount).sum();
    GoalsOverview {
        total_target,
        total_saved,
        completed: goals.iter().filter(|g| g.is_completed()).count(),
        progress_percent: total_saved.percent_of(total_target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_contribute() {
        let storage = Storage::in_memory();
        let service = GoalService::new(&storage);

        let goal = service
            .create(CreateGoalInput::new("Emergency fund", Money::from_major(1000)))
            .unwrap();
        assert_eq!(goal.current_amount, Money::zero());

        let goal = service.add_to_goal(goal.id, Money::from_major(250)).unwrap();
        assert_eq!(goal.current_amount, Money::from_major(250));
        assert_eq!(service.get(goal.id).unwrap().unwrap().current_amount, Money::from_major(250));
    }

    #[test]
    fn test_contribution_must_be_positive() {
        let storage = Storage::in_memory();
        let service = GoalService::new(&storage);
        let goal = service
            .create(CreateGoalInput::new("Car", Money::from_major(5000)))
            .unwrap();

        assert!(service.add_to_goal(goal.id, Money::zero()).unwrap_err().is_validation());
        assert!(service
            .add_to_goal(GoalId::new(), Money::from_major(1))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_create_rejects_zero_target() {
        let storage = Storage::in_memory();
        let service = GoalService::new(&storage);
        let err = service
            .create(CreateGoalInput::new("Nothing", Money::zero()))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_overview() {
        let storage = Storage::in_memory();
        let service = GoalService::new(&storage);
        assert_eq!(service.overview().unwrap().progress_percent, 0.0);

        let mut input = CreateGoalInput::new("Trip", Money::from_major(1000));
        input.current_amount = Some(Money::from_major(1000));
        service.create(input).unwrap();
        let mut input = CreateGoalInput::new("Laptop", Money::from_major(3000));
        input.current_amount = Some(Money::from_major(1000));
        service.create(input).unwrap();

        let overview = service.overview().unwrap();
        assert_eq!(overview.total_saved, Money::from_major(2000));
        assert_eq!(overview.completed, 1);
        assert!((overview.progress_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_and_delete() {
        let storage = Storage::in_memory();
        let service = GoalService::new(&storage);
        let goal = service
            .create(CreateGoalInput::new("Bike", Money::from_major(800)))
            .unwrap();

        let patch = GoalPatch {
            target_amount: Some(Money::from_major(900)),
            ..Default::default()
        };
        assert_eq!(
            service.update(goal.id, patch).unwrap().target_amount,
            Money::from_major(900)
        );

        service.delete(goal.id).unwrap();
        assert!(service.delete(goal.id).unwrap_err().is_not_found());
    }
}
