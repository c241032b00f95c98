/// Database models for CrewDesk
///
/// This module contains all database models and their CRUD operations.
/// Every resource except `company` carries a `company_id` column; companies
/// are the tenant boundary and are seeded externally.
///
/// # Models
///
/// - `company`: Tenant boundary (read-mostly)
/// - `user`: User accounts, roles, and authentication data
/// - `client`: Customers of a company
/// - `project`: Jobs for a client, authored by a user
/// - `task`: Work items within a project

pub mod client;
pub mod company;
pub mod project;
pub mod task;
pub mod user;

/// Error returned when a stored enum column contains an unrecognized value
///
/// Status and role columns are TEXT with CHECK constraints; this only fires
/// if the database and the application disagree about the allowed set.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized {field} value: {value}")]
pub struct EnumParseError {
    /// Column the value came from
    pub field: &'static str,

    /// The offending stored value
    pub value: String,
}
