use warden_domain::SortOrder;

/// Grid listing parameters after validation against the grid declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Quick-search text.
    pub search: Option<String>,
    /// Fields the quick search matches against.
    pub search_fields: Vec<String>,
    /// Ordering, always a sortable column.
    pub sort: SortOrder,
    /// One-based page number.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

impl ListQuery {
    /// Returns the number of rows skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Returns whether a record matches the quick search. `id` matches exactly,
    /// text fields match case-insensitive substrings.
    #[must_use]
    pub fn matches(&self, id: i64, text_field: impl Fn(&str) -> Option<String>) -> bool {
        let Some(search) = self.search.as_deref() else {
            return true;
        };

        let needle = search.to_lowercase();
        self.search_fields.iter().any(|field| {
            if field == "id" {
                return search.parse::<i64>().is_ok_and(|value| value == id);
            }

            text_field(field).is_some_and(|value| value.to_lowercase().contains(&needle))
        })
    }
}

/// One page of rows with the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Rows matching the query across all pages.
    pub total: u64,
}
