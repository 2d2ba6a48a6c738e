//! Screen payloads handed to the rendering engine.

use serde_json::{Map, Value};

use warden_core::{AppError, AppResult};
use warden_domain::{
    DetailDeclaration, FormDeclaration, GridDeclaration, RowActions, SortDirection, SortOrder,
};

use crate::ListQuery;

/// Default rows per grid page.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest accepted grid page size.
pub const MAX_PER_PAGE: u32 = 200;

/// Form declaration with its initial editor values.
#[derive(Debug, Clone, PartialEq)]
pub struct FormScreen {
    /// Declared fields and rules.
    pub declaration: FormDeclaration,
    /// Initial values keyed by field name.
    pub values: Map<String, Value>,
}

/// Grid declaration with one rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct GridScreen {
    /// Declared columns and switches.
    pub declaration: GridDeclaration,
    /// Rendered rows.
    pub rows: Vec<GridRow>,
    /// Rows matching the query across all pages.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

/// One rendered grid row.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// Record id.
    pub id: i64,
    /// Display cells keyed by column name.
    pub cells: Map<String, Value>,
    /// Actions offered on this row.
    pub actions: RowActions,
}

/// Detail declaration with rendered values.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailScreen {
    /// Declared fields and widgets.
    pub declaration: DetailDeclaration,
    /// Display values keyed by field name.
    pub values: Map<String, Value>,
}

/// Grid request as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRequest {
    /// Quick-search text.
    pub search: Option<String>,
    /// Requested ordering.
    pub sort: Option<SortOrder>,
    /// One-based page number.
    pub page: Option<u32>,
    /// Rows per page.
    pub per_page: Option<u32>,
}

impl GridRequest {
    /// Resolves the request against a grid declaration. Sorting is limited to
    /// sortable columns and defaults to the declared order, then `id asc`.
    pub fn into_query(self, grid: &GridDeclaration) -> AppResult<ListQuery> {
        let sort = match self.sort {
            Some(sort) if grid.can_sort_by(&sort.field) => sort,
            Some(sort) => {
                return Err(AppError::Validation(format!(
                    "grid cannot be sorted by '{}'",
                    sort.field
                )));
            }
            None => grid.default_sort().cloned().unwrap_or(SortOrder {
                field: "id".to_owned(),
                direction: SortDirection::Asc,
            }),
        };

        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(AppError::Validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }

        Ok(ListQuery {
            search: self
                .search
                .map(|search| search.trim().to_owned())
                .filter(|search| !search.is_empty()),
            search_fields: grid.quick_search_fields().to_vec(),
            sort,
            page: self.page.unwrap_or(1).max(1),
            per_page,
        })
    }
}
