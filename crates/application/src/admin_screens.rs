//! Declarations of the account and role administration screens.

mod account;
mod role;

pub use account::{account_detail, account_form, account_grid};
pub use role::{role_detail, role_form, role_grid};

use warden_domain::{EditorKind, FormField, Label};

fn id_field() -> FormField {
    FormField::new("id", Label::new("admin.id", "ID"), EditorKind::Display)
}

fn timestamp_fields() -> [FormField; 2] {
    [
        FormField::new("created_at", Label::admin("created_at"), EditorKind::Display),
        FormField::new("updated_at", Label::admin("updated_at"), EditorKind::Display),
    ]
}
