//! Declarative screen descriptions consumed by the rendering engine.

mod detail;
mod form;
mod grid;
mod label;
mod transform;

pub use detail::{DetailDeclaration, DetailField, DetailWidget};
pub use form::{
    EditorKind, FieldMutability, FieldRule, FieldValueFormat, FormDeclaration, FormField,
    FormMode, SelectOption, UniqueTarget,
};
pub use grid::{GridColumn, GridDeclaration, GridToolbar, RowActions, SortDirection, SortOrder};
pub use label::Label;
pub use transform::{DisplayTransform, Transform};

use serde::{Deserialize, Serialize};

/// Administrative resource a screen belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Administrator accounts.
    Account,
    /// Roles.
    Role,
}

impl ResourceKind {
    /// Returns the stable resource identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Role => "role",
        }
    }
}
