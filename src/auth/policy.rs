//! Access decisions for every resource the API exposes.
//!
//! Handlers never compare roles themselves: they describe the resource they are
//! about to touch and ask [`can_access`] (or [`authorize`], which turns a deny
//! into [`ApiError::Forbidden`]).

use strum_macros::Display;

use crate::error::{ApiError, ApiResult};
use crate::model::role::Role;

/// Who is asking. `id` is the caller's employee identity; accounts without an
/// employee record (e.g. a pure admin login) have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Option<u64>,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Read,
    Write,
    Create,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Profile,
    Attendance,
    Leave,
    Payroll,
}

impl ResourceKind {
    /// Self-scoped resources may be touched by their owner; the rest are privileged-only.
    pub fn is_self_scoped(self) -> bool {
        match self {
            ResourceKind::Profile | ResourceKind::Attendance | ResourceKind::Leave => true,
            ResourceKind::Payroll => false,
        }
    }
}

/// The target of a request. `owner_id` is `None` for collection-wide requests
/// (e.g. listing every employee's leave).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub owner_id: Option<u64>,
}

impl Resource {
    pub fn owned_by(kind: ResourceKind, owner_id: u64) -> Self {
        Self {
            kind,
            owner_id: Some(owner_id),
        }
    }

    pub fn collection(kind: ResourceKind) -> Self {
        Self {
            kind,
            owner_id: None,
        }
    }
}

pub fn can_access(actor: &Actor, resource: &Resource, action: Action) -> bool {
    if actor.role.is_privileged() {
        return true;
    }

    let is_owner = matches!((actor.id, resource.owner_id), (Some(a), Some(o)) if a == o);
    if !is_owner || !resource.kind.is_self_scoped() {
        return false;
    }

    match action {
        Action::Read | Action::Write | Action::Create => true,
        Action::Delete => false,
    }
}

pub fn authorize(actor: &Actor, resource: &Resource, action: Action) -> ApiResult<()> {
    if can_access(actor, resource, action) {
        return Ok(());
    }

    tracing::info!(
        role = %actor.role,
        actor_id = ?actor.id,
        resource = %resource.kind,
        owner_id = ?resource.owner_id,
        action = %action,
        "Access denied"
    );

    Err(ApiError::Forbidden(format!(
        "Not allowed to {} this {} resource",
        action, resource.kind
    )))
}

/// Narrows a list filter to what the caller may read. Privileged callers keep
/// their filter (`None` lists everyone); anyone else defaults to themselves
/// and is refused when naming another employee.
pub fn scope_list(actor: &Actor, kind: ResourceKind, requested: Option<u64>) -> ApiResult<Option<u64>> {
    if actor.role.is_privileged() {
        return Ok(requested);
    }

    let target = match requested.or(actor.id) {
        Some(id) => id,
        None => return authorize(actor, &Resource::collection(kind), Action::Read).map(|_| None),
    };

    authorize(actor, &Resource::owned_by(kind, target), Action::Read)?;
    Ok(Some(target))
}
