//! Listing modifiers for the product collection: search terms, ordering and
//! pagination bounds.

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Default page size when `limit` is omitted.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page size a client may request.
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Clamp a requested page size into `1..=MAX_PAGE_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Fields matched by the free-text `search` parameter.
pub const SEARCH_FIELDS: &[&str] = &["name", "description", "sku", "barcode"];

/// Split a search string into terms on whitespace and commas.
///
/// Each term must match at least one of [`SEARCH_FIELDS`]; terms are ANDed.
pub fn search_terms(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build a case-insensitive `ILIKE` substring pattern for `term`, matching
/// `%`, `_` and `\` literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Fields the collection may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    CreatedAt,
}

impl SortField {
    /// Column name, identical to the wire field name.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::CreatedAt => "created_at",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(SortField::Name),
            "price" => Some(SortField::Price),
            "created_at" => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

/// Default listing order: newest first.
pub const DEFAULT_ORDERING: SortKey = SortKey {
    field: SortField::CreatedAt,
    descending: true,
};

/// Parse an `ordering` parameter such as `"-price,name"`.
///
/// Unknown fields are ignored and repeated fields keep their first
/// occurrence. Never returns an empty list: falls back to
/// [`DEFAULT_ORDERING`].
pub fn parse_ordering(raw: Option<&str>) -> Vec<SortKey> {
    let mut keys: Vec<SortKey> = Vec::new();

    for term in raw.unwrap_or_default().split(',').map(str::trim) {
        let (descending, name) = match term.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, term),
        };
        let Some(field) = SortField::from_name(name) else {
            continue;
        };
        if keys.iter().any(|k| k.field == field) {
            continue;
        }
        keys.push(SortKey { field, descending });
    }

    if keys.is_empty() {
        keys.push(DEFAULT_ORDERING);
    }
    keys
}
