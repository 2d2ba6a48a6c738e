//! Quick search, ordering and paging shared by the grid listings.

use sqlx::{Postgres, QueryBuilder};

use warden_application::{ListQuery, validate_identifier};
use warden_core::{AppError, AppResult};
use warden_domain::SortDirection;

/// Appends the quick-search `WHERE` clause. `id` matches exactly, every other
/// field matches a case-insensitive substring.
pub(crate) fn push_search(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &ListQuery,
) -> AppResult<()> {
    let Some(search) = query.search.as_deref() else {
        return Ok(());
    };

    let pattern = like_pattern(search);
    let exact_id = search.parse::<i64>().ok();
    let mut conditions = 0_usize;

    builder.push(" WHERE (");
    for field in &query.search_fields {
        validate_identifier(field)?;

        if field == "id" {
            let Some(id) = exact_id else {
                continue;
            };
            if conditions > 0 {
                builder.push(" OR ");
            }
            builder.push("id = ").push_bind(id);
        } else {
            if conditions > 0 {
                builder.push(" OR ");
            }
            builder
                .push(field.as_str())
                .push("::text ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        conditions += 1;
    }

    if conditions == 0 {
        builder.push("FALSE");
    }
    builder.push(')');

    Ok(())
}

/// Appends `ORDER BY`, `LIMIT` and `OFFSET`. Ties are broken by id.
pub(crate) fn push_page(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &ListQuery,
) -> AppResult<()> {
    validate_identifier(&query.sort.field)?;

    let direction = match query.sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };

    builder.push(" ORDER BY ").push(query.sort.field.as_str()).push(' ').push(direction);
    if query.sort.field != "id" {
        builder.push(", id ").push(direction);
    }

    let offset = i64::try_from(query.offset())
        .map_err(|error| AppError::Validation(format!("invalid page offset: {error}")))?;
    builder
        .push(" LIMIT ")
        .push_bind(i64::from(query.per_page))
        .push(" OFFSET ")
        .push_bind(offset);

    Ok(())
}

/// Converts a row count reported by the database.
pub(crate) fn row_total(total: i64) -> u64 {
    u64::try_from(total).unwrap_or(0)
}

fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for character in search.chars() {
        if matches!(character, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(character);
    }
    pattern.push('%');
    pattern
}
