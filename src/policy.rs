//! Per-action authorization.
//!
//! One pure decision table maps (resource, action) to a rule, and one pure
//! function applies a rule to the caller identity and the resource owner.
//! Denial distinguishes `Unauthenticated` (no identity at all) from
//! `Forbidden` (identity present, rule says no). No I/O happens here; the
//! handler loads the resource first and passes its owner id in.

use crate::auth::session::Identity;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Post,
    Comment,
    Like,
    Favorite,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Any caller, including anonymous.
    AllowAny,
    /// Any authenticated caller.
    Authenticated,
    /// The caller must own the resource.
    OwnerOnly,
    /// The caller must own the resource or be an admin.
    OwnerOrAdmin,
}

/// The decision table. Total over (resource, action) so callers cannot hit
/// an unmapped cell; rows not reachable from the HTTP surface (e.g. user
/// destroy) still carry the strictest sensible rule.
pub fn rule_for(resource: Resource, action: Action) -> Rule {
    use Action::*;
    use Rule::*;
    match resource {
        Resource::Post => match action {
            List | Retrieve => AllowAny,
            Create => Authenticated,
            Update => OwnerOnly,
            Destroy => OwnerOrAdmin,
        },
        Resource::Comment => match action {
            List | Retrieve => AllowAny,
            Create => Authenticated,
            Update | Destroy => OwnerOnly,
        },
        Resource::Like => match action {
            List => Authenticated,
            Retrieve => AllowAny,
            Create => Authenticated,
            Update | Destroy => OwnerOnly,
        },
        // Favorites are implicitly scoped to the caller: both halves of the
        // toggle only ever touch the caller's own (owner, post) row.
        Resource::Favorite => match action {
            List | Retrieve | Create | Update | Destroy => Authenticated,
        },
        Resource::User => match action {
            List | Retrieve => Authenticated,
            Create => AllowAny,
            Update | Destroy => OwnerOnly,
        },
    }
}

/// Apply a rule. `owner_id` is the owner of the already-loaded resource;
/// `None` for actions that have no target row (list, create).
pub fn authorize(
    caller: Option<&Identity>,
    rule: Rule,
    owner_id: Option<i64>,
) -> Result<(), AppError> {
    match rule {
        Rule::AllowAny => Ok(()),
        Rule::Authenticated => {
            caller.ok_or(AppError::Unauthenticated)?;
            Ok(())
        }
        Rule::OwnerOnly => {
            let caller = caller.ok_or(AppError::Unauthenticated)?;
            if owner_id == Some(caller.id) {
                Ok(())
            } else {
                Err(AppError::Forbidden)
            }
        }
        Rule::OwnerOrAdmin => {
            let caller = caller.ok_or(AppError::Unauthenticated)?;
            if caller.is_admin || owner_id == Some(caller.id) {
                Ok(())
            } else {
                Err(AppError::Forbidden)
            }
        }
    }
}

/// Look up the rule for (resource, action) and apply it in one step.
pub fn check(
    caller: Option<&Identity>,
    resource: Resource,
    action: Action,
    owner_id: Option<i64>,
) -> Result<(), AppError> {
    authorize(caller, rule_for(resource, action), owner_id)
}
