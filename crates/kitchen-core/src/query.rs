//! Translation of list/search request parameters into a store predicate and page window.

use serde::Deserialize;

use crate::domain::Recipe;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 12;
pub const MAX_LIMIT: u64 = 100;

/// Filter value meaning "no constraint".
pub const ALL: &str = "all";

/// Raw query string parameters of the recipe listing.
///
/// Numbers stay strings so malformed input can fall back to defaults instead
/// of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub cuisine: Option<String>,
    #[serde(rename = "type")]
    pub recipe_type: Option<String>,
    pub difficulty: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Store predicate: every present constraint must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Matches `name` or any ingredient, case-insensitively.
    pub search: Option<String>,
    pub cuisine: Option<String>,
    pub recipe_type: Option<String>,
    pub difficulty: Option<String>,
}

impl RecipeFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.cuisine.is_none()
            && self.recipe_type.is_none()
            && self.difficulty.is_none()
    }

    /// Evaluate the predicate against a loaded recipe.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let in_name = recipe.name.to_lowercase().contains(&term);
            let in_ingredients = recipe
                .ingredients
                .iter()
                .any(|i| i.to_lowercase().contains(&term));
            if !in_name && !in_ingredients {
                return false;
            }
        }

        equals(&self.cuisine, recipe.cuisine_type.as_str())
            && equals(&self.recipe_type, recipe.recipe_type.as_str())
            && equals(&self.difficulty, recipe.difficulty.as_str())
    }
}

fn equals(constraint: &Option<String>, value: &str) -> bool {
    constraint.as_deref().is_none_or(|wanted| wanted == value)
}

/// Page window over the ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

impl PageWindow {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            skip: page.saturating_sub(1).saturating_mul(limit),
        }
    }

    /// Pagination envelope for a result set of `total` matches.
    pub fn pagination(&self, total: u64) -> Pagination {
        let total_pages = total.div_ceil(self.limit.max(1));
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
            has_next_page: self.page < total_pages,
            has_prev_page: self.page > 1,
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub window: PageWindow,
}

/// Builds [`RecipeQuery`] values from [`ListParams`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    default_limit: u64,
    max_limit: u64,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl QueryBuilder {
    pub fn new(default_limit: u64, max_limit: u64) -> Self {
        Self {
            default_limit: default_limit.max(1),
            max_limit: max_limit.max(1),
        }
    }

    pub fn build(&self, params: &ListParams) -> RecipeQuery {
        let filter = RecipeFilter {
            search: params
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            cuisine: constraint(params.cuisine.as_deref()),
            recipe_type: constraint(params.recipe_type.as_deref()),
            difficulty: constraint(params.difficulty.as_deref()),
        };

        let page = coerce_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = coerce_positive(params.limit.as_deref())
            .unwrap_or(self.default_limit)
            .min(self.max_limit);

        RecipeQuery {
            filter,
            window: PageWindow::new(page, limit),
        }
    }
}

fn constraint(raw: Option<&str>) -> Option<String> {
    raw.filter(|v| !v.is_empty() && *v != ALL).map(String::from)
}

/// Leading-digit integer coercion; anything unusable or below 1 yields `None`.
fn coerce_positive(raw: Option<&str>) -> Option<u64> {
    let digits: String = raw?
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().ok().filter(|n| *n >= 1)
}
