/// Multi-tenant authorization policy
///
/// The single decision procedure gating every resource operation. Handlers
/// fetch the target row, then ask this module whether the authenticated
/// caller may proceed; the functions here are pure so the rules can be
/// tested without a database.
///
/// # Rules
///
/// - Resources with a direct `company_id` (clients, tasks, users): permitted
///   iff the caller's company matches. Any mismatch, including a resource
///   that does not exist at all, is reported as [`PolicyError::NotFound`],
///   never `Forbidden`, so cross-tenant probing cannot distinguish "exists
///   elsewhere" from "does not exist".
/// - Projects additionally carry an author. Listing is role-dependent
///   ([`project_list_scope`]); update/delete require ADMIN or authorship on
///   top of the company match, and fail with [`PolicyError::Forbidden`]
///   because within the tenant the project's existence is already known.
/// - References to other entities supplied on create/update (a task's
///   project or assignee, a project's client) must exist and share the
///   caller's company, else [`PolicyError::InvalidReference`].
/// - Nobody may delete their own user account.

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::Role;

/// Error type for authorization decisions
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Resource is absent or belongs to another company
    ///
    /// Deliberately indistinguishable from a genuinely missing resource.
    #[error("Resource not found")]
    NotFound,

    /// Caller is authenticated and the resource exists in their company,
    /// but this specific mutation is not theirs to make
    #[error("Not authorized to modify this resource")]
    Forbidden,

    /// A referenced entity does not exist or is cross-tenant
    #[error("Invalid reference: {0}")]
    InvalidReference(&'static str),

    /// Caller attempted to delete their own account
    #[error("You cannot delete your own account")]
    SelfDeletion,
}

/// Listing scope for projects, decided by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectListScope {
    /// ADMIN: every project of the company
    Company(Uuid),

    /// USER: only projects the caller authored
    Author(Uuid),
}

/// Decides the project listing scope for a caller
pub fn project_list_scope(auth: &AuthContext) -> ProjectListScope {
    match auth.role {
        Role::Admin => ProjectListScope::Company(auth.company_id),
        Role::User => ProjectListScope::Author(auth.user_id),
    }
}

/// Checks company-scoped access to a fetched resource
///
/// Pass the resource's `company_id` if the row was found, `None` otherwise;
/// both failure cases collapse into `NotFound`.
pub fn ensure_company_access(
    resource_company: Option<Uuid>,
    auth: &AuthContext,
) -> Result<(), PolicyError> {
    match resource_company {
        Some(company_id) if company_id == auth.company_id => Ok(()),
        _ => Err(PolicyError::NotFound),
    }
}

/// Checks whether a caller may update or delete a project
///
/// Company mismatch (or absence) is `NotFound`; a company-local project
/// that the caller neither authored nor administers is `Forbidden`.
pub fn ensure_project_mutation(
    project: Option<(Uuid, Uuid)>,
    auth: &AuthContext,
) -> Result<(), PolicyError> {
    let (company_id, author_id) = project.ok_or(PolicyError::NotFound)?;

    if company_id != auth.company_id {
        return Err(PolicyError::NotFound);
    }

    match auth.role {
        Role::Admin => Ok(()),
        Role::User if author_id == auth.user_id => Ok(()),
        Role::User => Err(PolicyError::Forbidden),
    }
}

/// Checks a referenced entity supplied in a create/update payload
///
/// `field` names the offending request field in the error. A missing or
/// cross-tenant reference is an `InvalidReference`, not a `NotFound`: the
/// target of the operation is the new resource, not the reference.
pub fn ensure_same_company_reference(
    reference_company: Option<Uuid>,
    auth: &AuthContext,
    field: &'static str,
) -> Result<(), PolicyError> {
    match reference_company {
        Some(company_id) if company_id == auth.company_id => Ok(()),
        _ => Err(PolicyError::InvalidReference(field)),
    }
}

/// Rejects deletion of the caller's own user account
pub fn ensure_not_self_deletion(target_user: Uuid, auth: &AuthContext) -> Result<(), PolicyError> {
    if target_user == auth.user_id {
        return Err(PolicyError::SelfDeletion);
    }

    Ok(())
}

/// Checks whether a caller may assign a role when creating or updating a user
///
/// Only admins may grant ADMIN. Regular users may create users (role
/// defaults to USER) but cannot escalate.
pub fn ensure_role_assignment(requested: Role, auth: &AuthContext) -> Result<(), PolicyError> {
    match (requested, auth.role) {
        (Role::Admin, Role::User) => Err(PolicyError::Forbidden),
        _ => Ok(()),
    }
}
