mod admin;
mod common;

pub use admin::{
    AccountResponse, DetailScreenResponse, FormQueryParams, FormScreenResponse,
    GridQueryParams, GridRowResponse, GridScreenResponse, MenuResponse, RoleResponse,
    RoleSummaryResponse,
};
pub use common::{HealthDependencyStatus, HealthResponse};
