//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod account;
mod protection;
mod role;
mod screen;
mod tree;

pub use account::{
    AccountId, DATETIME_EDITOR_FORMAT, DATETIME_FORMAT, END_AFTER_START_MESSAGE,
    PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, ValidityWindow, WINDOW_WITHIN_YEAR_MESSAGE,
    WindowViolation, format_datetime, parse_datetime, within_one_year,
};
pub use protection::ProtectionPolicy;
pub use role::{DataScope, RoleId};
pub use screen::{
    DetailDeclaration, DetailField, DetailWidget, DisplayTransform, EditorKind, FieldMutability,
    FieldRule, FieldValueFormat, FormDeclaration, FormField, FormMode, GridColumn,
    GridDeclaration, GridToolbar, Label, ResourceKind, RowActions, SelectOption, SortDirection,
    SortOrder, Transform, UniqueTarget,
};
pub use tree::{TreeItem, TreeNode, TreeSelection, TreeViewModel, build_tree};
