//! Save-time evaluation of declared form rules.

use std::collections::HashSet;
use std::sync::Arc;

use warden_core::{AppError, AppResult, FieldError};
use warden_domain::{
    DATETIME_EDITOR_FORMAT, EditorKind, FieldRule, FormDeclaration, FormField, parse_datetime,
    within_one_year,
};

use crate::{FormSubmission, UniquenessProbe};

/// Evaluates every rule of a form declaration against a submission.
#[derive(Clone)]
pub struct FormValidator {
    probe: Arc<dyn UniquenessProbe>,
}

impl FormValidator {
    /// Creates a validator backed by a uniqueness probe.
    #[must_use]
    pub fn new(probe: Arc<dyn UniquenessProbe>) -> Self {
        Self { probe }
    }

    /// Checks the submission and returns every violation at once as
    /// [`AppError::InvalidFields`]. Fields that are not submitted are skipped.
    pub async fn validate(
        &self,
        declaration: &FormDeclaration,
        submission: &FormSubmission,
    ) -> AppResult<()> {
        let mut errors = Vec::new();

        for field in declaration
            .fields()
            .iter()
            .filter(|field| field.mutability().submits())
        {
            self.check_field(field, submission, &mut errors).await?;
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(errors))
        }
    }

    async fn check_field(
        &self,
        field: &FormField,
        submission: &FormSubmission,
        errors: &mut Vec<FieldError>,
    ) -> AppResult<()> {
        let name = field.name();
        let blank = submission.is_blank(name);
        let violations_before = errors.len();

        for rule in field.rules() {
            match rule {
                FieldRule::Required if blank => {
                    errors.push(FieldError::new(name, "this field is required"));
                }
                FieldRule::Same { field: other } => {
                    let other_blank = submission.is_blank(other);
                    if (!blank || !other_blank)
                        && submission.text_or_empty(name) != submission.text_or_empty(other)
                    {
                        errors.push(FieldError::new(name, format!("must match {other}")));
                    }
                }
                _ => {}
            }
        }

        if blank {
            return Ok(());
        }

        if let Some(message) = editor_violation(field, submission) {
            errors.push(FieldError::new(name, message));
        }

        if errors.len() > violations_before {
            return Ok(());
        }

        for rule in field.rules() {
            match rule {
                FieldRule::Required | FieldRule::Same { .. } => {}
                FieldRule::Length { min, max } => {
                    let count = submission.text_or_empty(name).chars().count();
                    if let Some(min) = min.filter(|min| count < *min) {
                        errors.push(FieldError::new(
                            name,
                            format!("must be at least {min} characters"),
                        ));
                    }
                    if let Some(max) = max.filter(|max| count > *max) {
                        errors.push(FieldError::new(
                            name,
                            format!("may not be greater than {max} characters"),
                        ));
                    }
                }
                FieldRule::After { field: other, message } => {
                    let value = submission.datetime(name).ok().flatten();
                    let earlier = submission.datetime(other).ok().flatten();
                    let satisfied = matches!(
                        (earlier, value),
                        (Some(earlier), Some(value)) if value > earlier
                    );
                    if !satisfied {
                        errors.push(FieldError::new(name, message.clone()));
                    }
                }
                FieldRule::WithinYearOf { field: other, message } => {
                    let value = submission.datetime(name).ok().flatten();
                    let start = submission.datetime(other).ok().flatten();
                    if let (Some(start), Some(value)) = (start, value)
                        && !within_one_year(start, value)
                    {
                        errors.push(FieldError::new(name, message.clone()));
                    }
                }
                FieldRule::Unique { target, except } => {
                    let value = submission.text_or_empty(name);
                    if self
                        .probe
                        .value_exists(target, value.trim(), *except)
                        .await?
                    {
                        errors.push(FieldError::new(name, "has already been taken"));
                    }
                }
            }
        }

        Ok(())
    }
}

fn editor_violation(field: &FormField, submission: &FormSubmission) -> Option<String> {
    let name = field.name();
    match field.editor() {
        EditorKind::DateTime { .. } => {
            let text = submission.text(name)?;
            parse_datetime(&text)
                .err()
                .map(|_| format!("must be a date in {DATETIME_EDITOR_FORMAT} format"))
        }
        EditorKind::Select { options } | EditorKind::Radio { options, .. } => {
            let allowed: HashSet<i64> = options.iter().map(|option| option.value).collect();
            match submission.ids(name) {
                Ok(ids) if ids.iter().all(|id| allowed.contains(id)) => None,
                _ => Some("is not one of the available options".to_owned()),
            }
        }
        EditorKind::Tree { nodes, .. } => {
            let allowed: HashSet<i64> = nodes.iter().map(|node| node.id).collect();
            match submission.ids(name) {
                Ok(ids) if ids.iter().all(|id| allowed.contains(id)) => None,
                _ => Some("contains unknown entries".to_owned()),
            }
        }
        EditorKind::Display
        | EditorKind::Text
        | EditorKind::Image { .. }
        | EditorKind::Password => None,
    }
}
