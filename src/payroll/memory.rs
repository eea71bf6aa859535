//! In-memory salary storage for tests. Uniqueness per employee is checked and
//! applied under one write lock, the way the unique key serializes creators in MySQL.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::repository::SalaryStructureRepository;
use crate::error::{ApiError, ApiResult};
use crate::model::salary_structure::{NewSalaryStructure, SalaryStructure, SalaryStructureInput};

#[derive(Default)]
pub struct InMemorySalaryRepository {
    rows: RwLock<HashMap<u64, SalaryStructure>>,
    next_id: AtomicU64,
    /// Known employees and their display names. When set, inserts for other
    /// employees fail like a foreign-key violation.
    employees: Option<HashMap<u64, String>>,
}

impl InMemorySalaryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees<'a>(employees: impl IntoIterator<Item = (u64, &'a str)>) -> Self {
        Self {
            employees: Some(
                employees
                    .into_iter()
                    .map(|(id, name)| (id, name.to_string()))
                    .collect(),
            ),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SalaryStructureRepository for InMemorySalaryRepository {
    async fn list(&self, limit: u32, offset: u64) -> ApiResult<(Vec<SalaryStructure>, i64)> {
        let rows = self.rows.read().expect("salary rows poisoned");
        let mut all: Vec<_> = rows.values().cloned().collect();
        all.sort_by_key(|s| s.id);

        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: u64) -> ApiResult<Option<SalaryStructure>> {
        Ok(self.rows.read().expect("salary rows poisoned").get(&id).cloned())
    }

    async fn find_by_employee(&self, employee_id: u64) -> ApiResult<Option<SalaryStructure>> {
        let rows = self.rows.read().expect("salary rows poisoned");
        Ok(rows.values().find(|s| s.employee_id == employee_id).cloned())
    }

    async fn insert(&self, new: NewSalaryStructure, now: DateTime<Utc>) -> ApiResult<SalaryStructure> {
        let employee_name = match &self.employees {
            Some(known) => match known.get(&new.employee_id) {
                Some(name) => Some(name.clone()),
                None => {
                    return Err(ApiError::NotFound(format!(
                        "Employee {} not found",
                        new.employee_id
                    )));
                }
            },
            None => None,
        };

        let mut rows = self.rows.write().expect("salary rows poisoned");
        if rows.values().any(|s| s.employee_id == new.employee_id) {
            return Err(ApiError::Conflict(format!(
                "Salary structure already exists for employee {}",
                new.employee_id
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = SalaryStructure {
            employee_name,
            ..new.into_stored(id, now)
        };
        rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: u64,
        patch: &SalaryStructureInput,
        updated_at: DateTime<Utc>,
    ) -> ApiResult<Option<SalaryStructure>> {
        let mut rows = self.rows.write().expect("salary rows poisoned");
        Ok(rows.get_mut(&id).map(|stored| {
            patch.apply_to(stored);
            stored.updated_at = updated_at;
            stored.clone()
        }))
    }

    async fn delete(&self, id: u64) -> ApiResult<bool> {
        Ok(self
            .rows
            .write()
            .expect("salary rows poisoned")
            .remove(&id)
            .is_some())
    }
}
