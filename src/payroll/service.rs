use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::calculator::SalaryView;
use super::repository::SalaryStructureRepository;
use crate::auth::policy::{Action, Actor, Resource, ResourceKind, authorize};
use crate::error::{ApiError, ApiResult};
use crate::model::salary_structure::SalaryStructureInput;
use crate::utils::db_utils::page_window;

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSalaryResponse {
    pub data: Vec<SalaryView>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// Salary structure workflows. Every call checks the access policy first and
/// answers with freshly computed breakdowns.
#[derive(Clone)]
pub struct PayrollService {
    repo: Arc<dyn SalaryStructureRepository>,
}

fn payroll_of(employee_id: u64) -> Resource {
    Resource::owned_by(ResourceKind::Payroll, employee_id)
}

fn not_found_for_employee(employee_id: u64) -> ApiError {
    ApiError::NotFound(format!(
        "Salary structure not found for employee {}",
        employee_id
    ))
}

fn not_found(id: u64) -> ApiError {
    ApiError::NotFound(format!("Salary structure {} not found", id))
}

fn validate_patch(patch: &SalaryStructureInput) -> ApiResult<()> {
    if patch.is_empty() {
        return Err(ApiError::Validation("No fields provided for update".to_string()));
    }
    patch.validate()
}

impl PayrollService {
    pub fn new(repo: Arc<dyn SalaryStructureRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, actor: &Actor, page: u32, per_page: u32) -> ApiResult<PaginatedSalaryResponse> {
        authorize(actor, &Resource::collection(ResourceKind::Payroll), Action::Read)?;

        let (page, per_page, offset) = page_window(Some(page), Some(per_page));

        let (rows, total) = self.repo.list(per_page, offset).await?;

        Ok(PaginatedSalaryResponse {
            data: rows.into_iter().map(SalaryView::from).collect(),
            page,
            per_page,
            total,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        actor: &Actor,
        employee_id: u64,
        input: SalaryStructureInput,
    ) -> ApiResult<SalaryView> {
        authorize(actor, &payroll_of(employee_id), Action::Create)?;
        input.validate()?;

        if self.repo.find_by_employee(employee_id).await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "Salary structure already exists for employee {}",
                employee_id
            )));
        }

        // a concurrent creator that slipped past the check above loses at the unique key
        let stored = self
            .repo
            .insert(input.into_new(employee_id), Utc::now())
            .await?;

        info!(id = stored.id, employee_id, "Salary structure created");
        Ok(SalaryView::from(stored))
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, actor: &Actor, employee_id: u64) -> ApiResult<SalaryView> {
        authorize(actor, &payroll_of(employee_id), Action::Read)?;

        self.repo
            .find_by_employee(employee_id)
            .await?
            .map(SalaryView::from)
            .ok_or_else(|| not_found_for_employee(employee_id))
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        actor: &Actor,
        employee_id: u64,
        patch: SalaryStructureInput,
    ) -> ApiResult<SalaryView> {
        authorize(actor, &payroll_of(employee_id), Action::Write)?;
        validate_patch(&patch)?;

        let current = self
            .repo
            .find_by_employee(employee_id)
            .await?
            .ok_or_else(|| not_found_for_employee(employee_id))?;

        self.apply(current.id, &patch)
            .await?
            .ok_or_else(|| not_found_for_employee(employee_id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, employee_id: u64) -> ApiResult<()> {
        authorize(actor, &payroll_of(employee_id), Action::Delete)?;

        let current = self
            .repo
            .find_by_employee(employee_id)
            .await?
            .ok_or_else(|| not_found_for_employee(employee_id))?;

        self.remove(current.id)
            .await?
            .then_some(())
            .ok_or_else(|| not_found_for_employee(employee_id))
    }

    // Addressed by the structure's own id: the owner is unknown until the row is
    // loaded, so access is checked against the whole payroll collection.

    #[instrument(skip(self))]
    pub async fn fetch_by_id(&self, actor: &Actor, id: u64) -> ApiResult<SalaryView> {
        authorize(actor, &Resource::collection(ResourceKind::Payroll), Action::Read)?;

        self.repo
            .find_by_id(id)
            .await?
            .map(SalaryView::from)
            .ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self, patch))]
    pub async fn update_by_id(
        &self,
        actor: &Actor,
        id: u64,
        patch: SalaryStructureInput,
    ) -> ApiResult<SalaryView> {
        authorize(actor, &Resource::collection(ResourceKind::Payroll), Action::Write)?;
        validate_patch(&patch)?;

        self.apply(id, &patch).await?.ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, actor: &Actor, id: u64) -> ApiResult<()> {
        authorize(actor, &Resource::collection(ResourceKind::Payroll), Action::Delete)?;

        self.remove(id).await?.then_some(()).ok_or_else(|| not_found(id))
    }

    async fn apply(&self, id: u64, patch: &SalaryStructureInput) -> ApiResult<Option<SalaryView>> {
        let updated = self.repo.update(id, patch, Utc::now()).await?;

        if let Some(stored) = &updated {
            info!(id, employee_id = stored.employee_id, "Salary structure updated");
        }
        Ok(updated.map(SalaryView::from))
    }

    async fn remove(&self, id: u64) -> ApiResult<bool> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            info!(id, "Salary structure deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::payroll::memory::InMemorySalaryRepository;
    use rust_decimal_macros::dec;

    const ADMIN: Actor = Actor {
        id: None,
        role: Role::Admin,
    };
    const HR: Actor = Actor {
        id: Some(2),
        role: Role::Hr,
    };

    fn employee(id: u64) -> Actor {
        Actor {
            id: Some(id),
            role: Role::Employee,
        }
    }

    fn service() -> PayrollService {
        PayrollService::new(Arc::new(InMemorySalaryRepository::new()))
    }

    fn wage(amount: rust_decimal::Decimal) -> SalaryStructureInput {
        SalaryStructureInput {
            monthly_wage: Some(amount),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn create_applies_defaults_and_computes() {
        let svc = service();
        let view = svc.create(&HR, 10, wage(dec!(30000))).await.unwrap();

        assert_eq!(view.structure.employee_id, 10);
        assert_eq!(view.structure.professional_tax, dec!(200));
        assert_eq!(view.derived.total_earnings, dec!(23499.00));
        assert_eq!(view.derived.net_salary, dec!(21499.00));
        assert_eq!(view.structure.created_at, view.structure.updated_at);
    }

    #[actix_web::test]
    async fn second_create_conflicts() {
        let svc = service();
        svc.create(&ADMIN, 10, wage(dec!(1000))).await.unwrap();

        let err = svc.create(&HR, 10, wage(dec!(2000))).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let kept = svc.fetch(&ADMIN, 10).await.unwrap();
        assert_eq!(kept.structure.monthly_wage, dec!(1000));
    }

    #[actix_web::test]
    async fn concurrent_creates_leave_exactly_one() {
        let svc = service();
        let attempts = (0..8).map(|i| {
            let svc = svc.clone();
            async move { svc.create(&ADMIN, 77, wage(rust_decimal::Decimal::from(i))).await }
        });

        let results = futures::future::join_all(attempts).await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, ApiError::Conflict(_)))
        );
    }

    #[actix_web::test]
    async fn create_for_unknown_employee_is_not_found() {
        let svc = PayrollService::new(Arc::new(InMemorySalaryRepository::with_employees([(1, "Ada Lovelace"), (2, "Alan Turing")])));
        let err = svc.create(&ADMIN, 3, wage(dec!(1))).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn create_rejects_negative_money() {
        let err = service()
            .create(&ADMIN, 1, wage(dec!(-5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn employees_are_denied_everywhere() {
        let svc = service();
        svc.create(&ADMIN, 5, wage(dec!(100))).await.unwrap();
        let me = employee(5);

        assert!(matches!(svc.fetch(&me, 5).await, Err(ApiError::Forbidden(_))));
        assert!(matches!(svc.fetch(&me, 6).await, Err(ApiError::Forbidden(_))));
        assert!(matches!(
            svc.create(&me, 5, SalaryStructureInput::default()).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            svc.update(&me, 5, wage(dec!(1))).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(svc.delete(&me, 5).await, Err(ApiError::Forbidden(_))));
        assert!(matches!(svc.list(&me, 1, 10).await, Err(ApiError::Forbidden(_))));
        assert!(matches!(svc.fetch_by_id(&me, 1).await, Err(ApiError::Forbidden(_))));
        assert!(matches!(svc.delete_by_id(&me, 1).await, Err(ApiError::Forbidden(_))));
    }

    #[actix_web::test]
    async fn update_changes_only_wage_and_recomputes() {
        let svc = service();
        let created = svc
            .create(
                &ADMIN,
                4,
                SalaryStructureInput {
                    monthly_wage: Some(dec!(30000)),
                    food_allowance: Some(dec!(500)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        svc.update(&HR, 4, wage(dec!(40000))).await.unwrap();
        let fetched = svc.fetch(&HR, 4).await.unwrap();

        assert_eq!(fetched.structure.monthly_wage, dec!(40000));
        assert_eq!(fetched.structure.food_allowance, dec!(500));
        assert_eq!(fetched.structure.created_at, created.structure.created_at);
        assert!(fetched.structure.updated_at >= created.structure.updated_at);
        assert_eq!(fetched.derived.basic_salary, dec!(20000));
        assert_eq!(fetched.derived.hra, dec!(8000));
        assert_eq!(fetched.derived.yearly_wage, dec!(480000));
        assert_eq!(fetched.derived.net_salary, dec!(29232.00));
    }

    #[actix_web::test]
    async fn update_missing_is_not_found() {
        let err = service().update(&ADMIN, 9, wage(dec!(1))).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn empty_update_is_rejected() {
        let svc = service();
        svc.create(&ADMIN, 9, wage(dec!(1))).await.unwrap();
        let err = svc
            .update(&ADMIN, 9, SalaryStructureInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn fetch_without_structure_is_not_found() {
        let err = service().fetch(&HR, 12).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn delete_removes_the_record() {
        let svc = service();
        svc.create(&ADMIN, 3, wage(dec!(1))).await.unwrap();

        svc.delete(&HR, 3).await.unwrap();

        assert!(matches!(svc.fetch(&HR, 3).await, Err(ApiError::NotFound(_))));
        assert!(matches!(svc.delete(&HR, 3).await, Err(ApiError::NotFound(_))));
        // the employee can get a fresh structure afterwards
        svc.create(&ADMIN, 3, wage(dec!(2))).await.unwrap();
    }

    #[actix_web::test]
    async fn id_addressed_operations() {
        let svc = service();
        let created = svc.create(&ADMIN, 8, wage(dec!(1000))).await.unwrap();
        let id = created.structure.id;

        assert_eq!(svc.fetch_by_id(&HR, id).await.unwrap(), created);

        let updated = svc
            .update_by_id(
                &HR,
                id,
                SalaryStructureInput {
                    professional_tax: Some(dec!(0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.derived.total_deductions, dec!(60));

        assert!(matches!(
            svc.update_by_id(&HR, id + 100, wage(dec!(1))).await,
            Err(ApiError::NotFound(_))
        ));

        svc.delete_by_id(&ADMIN, id).await.unwrap();
        assert!(matches!(svc.fetch_by_id(&HR, id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(svc.delete_by_id(&HR, id).await, Err(ApiError::NotFound(_))));
    }

    #[actix_web::test]
    async fn list_pages_in_id_order() {
        let svc = service();
        for employee_id in 1..=5 {
            svc.create(&ADMIN, employee_id, wage(dec!(1000))).await.unwrap();
        }

        let page = svc.list(&HR, 2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(
            page.data.iter().map(|v| v.structure.employee_id).collect::<Vec<_>>(),
            vec![3, 4]
        );

        let clamped = svc.list(&HR, 0, 1000).await.unwrap();
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.per_page, 100);
        assert_eq!(clamped.data.len(), 5);
    }

    #[actix_web::test]
    async fn last_possible_page_is_empty() {
        let svc = service();
        svc.create(&ADMIN, 1, wage(dec!(1000))).await.unwrap();

        let page = svc.list(&ADMIN, u32::MAX, 10).await.unwrap();
        assert_eq!(page.page, u32::MAX);
        assert_eq!(page.total, 1);
        assert!(page.data.is_empty());
    }
}
