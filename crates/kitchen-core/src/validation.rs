//! Recipe input normalization and validation.
//!
//! Validation runs once, before any persistence call, and reports every
//! failing field together.

use crate::domain::{CuisineType, Difficulty, Recipe, RecipeFields, RecipeType};
use crate::error::{DomainError, FieldError};

pub const NAME_LEN: (usize, usize) = (2, 100);
pub const DESCRIPTION_LEN: (usize, usize) = (10, 1000);
pub const STEPS_MIN_LEN: usize = 10;
pub const SERVINGS_RANGE: (i64, i64) = (1, 50);
/// Upper bound matches the `INTEGER` column it is stored in.
pub const COOKING_TIME_RANGE: (i64, i64) = (1, i32::MAX as i64);
pub const COMMENT_MAX_LEN: usize = 500;

/// Ingredients as they arrive on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngredientsInput {
    /// Already structured, e.g. repeated form parts.
    List(Vec<String>),
    /// A JSON-encoded array or a comma-separated string.
    Text(String),
}

/// Normalize ingredients to a clean list.
///
/// Precedence for text input: parse as a JSON array of strings after turning
/// literal `\n` and `\\` escapes into their characters, then as the JSON text
/// exactly as received; if neither parses, split the original text on commas.
/// Every path replaces embedded newlines with a space, trims each entry and
/// drops empty ones.
pub fn normalize_ingredients(input: &IngredientsInput) -> Vec<String> {
    match input {
        IngredientsInput::List(items) => clean(items.iter().map(String::as_str)),
        IngredientsInput::Text(text) => {
            let unescaped = text.replace("\\n", "\n").replace("\\\\", "\\");
            serde_json::from_str::<Vec<String>>(&unescaped)
                .or_else(|_| serde_json::from_str::<Vec<String>>(text))
                .map(|items| clean(items.iter().map(String::as_str)))
                .unwrap_or_else(|_| clean(text.split(',')))
        }
    }
}

fn clean<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(|item| item.replace(['\r', '\n'], " ").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Unvalidated recipe fields, each optional so the same type serves full
/// creates and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<IngredientsInput>,
    pub steps: Option<String>,
    pub servings: Option<String>,
    pub cooking_time: Option<String>,
    pub cuisine_type: Option<String>,
    pub recipe_type: Option<String>,
    pub difficulty: Option<String>,
}

impl RecipeInput {
    /// Overlay the provided fields of `patch` onto `self`.
    pub fn merge(mut self, patch: RecipeInput) -> Self {
        macro_rules! overlay {
            ($($field:ident),+) => {
                $(if patch.$field.is_some() {
                    self.$field = patch.$field;
                })+
            };
        }
        overlay!(
            name,
            description,
            ingredients,
            steps,
            servings,
            cooking_time,
            cuisine_type,
            recipe_type,
            difficulty
        );
        self
    }
}

impl From<&Recipe> for RecipeInput {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: Some(recipe.name.clone()),
            description: Some(recipe.description.clone()),
            ingredients: Some(IngredientsInput::List(recipe.ingredients.clone())),
            steps: Some(recipe.steps.clone()),
            servings: Some(recipe.servings.to_string()),
            cooking_time: Some(recipe.cooking_time.to_string()),
            cuisine_type: Some(recipe.cuisine_type.to_string()),
            recipe_type: Some(recipe.recipe_type.to_string()),
            difficulty: Some(recipe.difficulty.to_string()),
        }
    }
}

/// Validate and normalize a complete input into storable fields.
pub fn validate_recipe(input: &RecipeInput) -> Result<RecipeFields, DomainError> {
    let mut errors = Vec::new();

    let name = trimmed(&input.name);
    if !within(name, NAME_LEN) {
        errors.push(FieldError::new(
            "name",
            "Recipe name must be between 2 and 100 characters",
        ));
    }

    let description = trimmed(&input.description);
    if !within(description, DESCRIPTION_LEN) {
        errors.push(FieldError::new(
            "description",
            "Description must be between 10 and 1000 characters",
        ));
    }

    let ingredients = input
        .ingredients
        .as_ref()
        .map(normalize_ingredients)
        .unwrap_or_default();
    if ingredients.is_empty() {
        errors.push(FieldError::new(
            "ingredients",
            "At least one ingredient is required",
        ));
    }

    let steps = trimmed(&input.steps);
    if steps.chars().count() < STEPS_MIN_LEN {
        errors.push(FieldError::new(
            "steps",
            "Cooking steps must be at least 10 characters",
        ));
    }

    let servings = parse_int(&input.servings)
        .filter(|n| (SERVINGS_RANGE.0..=SERVINGS_RANGE.1).contains(n));
    if servings.is_none() {
        errors.push(FieldError::new(
            "servings",
            "Servings must be between 1 and 50",
        ));
    }

    let cooking_time = parse_int(&input.cooking_time)
        .filter(|n| (COOKING_TIME_RANGE.0..=COOKING_TIME_RANGE.1).contains(n));
    if cooking_time.is_none() {
        errors.push(FieldError::new(
            "cookingTime",
            "Cooking time must be at least 1 minute",
        ));
    }

    let cuisine_type = parse_label::<CuisineType>(&input.cuisine_type);
    if cuisine_type.is_none() {
        errors.push(FieldError::new(
            "cuisineType",
            "Please select a valid cuisine type",
        ));
    }

    let recipe_type = parse_label::<RecipeType>(&input.recipe_type);
    if recipe_type.is_none() {
        errors.push(FieldError::new(
            "recipeType",
            "Please select a valid recipe type",
        ));
    }

    let difficulty = parse_label::<Difficulty>(&input.difficulty);
    if difficulty.is_none() {
        errors.push(FieldError::new(
            "difficulty",
            "Please select a valid difficulty level",
        ));
    }

    match (servings, cooking_time, cuisine_type, recipe_type, difficulty) {
        (Some(servings), Some(cooking_time), Some(cuisine_type), Some(recipe_type), Some(difficulty))
            if errors.is_empty() =>
        {
            Ok(RecipeFields {
                name: name.to_string(),
                description: description.to_string(),
                ingredients,
                steps: steps.to_string(),
                servings: servings as u32,
                cooking_time: cooking_time as u32,
                cuisine_type,
                recipe_type,
                difficulty,
            })
        }
        _ => Err(DomainError::Validation(errors)),
    }
}

/// Trim comment text and check its length.
pub fn validate_comment(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    let len = text.chars().count();
    if len == 0 || len > COMMENT_MAX_LEN {
        return Err(DomainError::Validation(vec![FieldError::new(
            "text",
            "Comment must be between 1 and 500 characters",
        )]));
    }
    Ok(text.to_string())
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

fn within(value: &str, (min, max): (usize, usize)) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Integer, or a number with an empty fraction such as `4.0` from a JSON body.
fn parse_int(value: &Option<String>) -> Option<i64> {
    let value = value.as_deref()?.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
        .map(|f| f as i64)
}

fn parse_label<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> RecipeInput {
        RecipeInput {
            name: Some("  Margherita Pizza ".to_string()),
            description: Some("Classic Neapolitan pizza with basil".to_string()),
            ingredients: Some(IngredientsInput::Text("dough, tomato, mozzarella".to_string())),
            steps: Some("Stretch the dough.\nTop it.\nBake hot.".to_string()),
            servings: Some("4".to_string()),
            cooking_time: Some("30".to_string()),
            cuisine_type: Some("Italian".to_string()),
            recipe_type: Some("Main Course".to_string()),
            difficulty: Some("Medium".to_string()),
        }
    }

    #[test]
    fn test_comma_separated_ingredients() {
        let input = IngredientsInput::Text("2 cups flour, 1 cup sugar,  3 eggs ".to_string());
        assert_eq!(
            normalize_ingredients(&input),
            vec!["2 cups flour", "1 cup sugar", "3 eggs"]
        );
    }

    #[test]
    fn test_json_ingredients_with_escaped_newlines() {
        let input = IngredientsInput::Text(r#"["2 cups\nflour", " salt ", ""]"#.to_string());
        assert_eq!(normalize_ingredients(&input), vec!["2 cups flour", "salt"]);
    }

    #[test]
    fn test_json_that_is_not_a_list_falls_back_to_commas() {
        let input = IngredientsInput::Text("42".to_string());
        assert_eq!(normalize_ingredients(&input), vec!["42"]);

        let input = IngredientsInput::Text("[\"unterminated, pepper".to_string());
        assert_eq!(
            normalize_ingredients(&input),
            vec!["[\"unterminated", "pepper"]
        );
    }

    #[test]
    fn test_structured_ingredients_are_trimmed() {
        let input = IngredientsInput::List(vec![" oil ".to_string(), "  ".to_string()]);
        assert_eq!(normalize_ingredients(&input), vec!["oil"]);
    }

    #[test]
    fn test_valid_recipe_is_normalized() {
        let fields = validate_recipe(&valid_input()).unwrap();
        assert_eq!(fields.name, "Margherita Pizza");
        assert_eq!(fields.ingredients.len(), 3);
        assert_eq!(fields.steps, "Stretch the dough.\nTop it.\nBake hot.");
        assert_eq!(fields.servings, 4);
        assert_eq!(fields.cooking_time, 30);
        assert_eq!(fields.recipe_type, RecipeType::MainCourse);
    }

    #[test]
    fn test_every_failing_field_is_reported() {
        let input = RecipeInput {
            name: Some("x".to_string()),
            description: Some("short".to_string()),
            ingredients: Some(IngredientsInput::Text(" , ,".to_string())),
            steps: None,
            servings: Some("51".to_string()),
            cooking_time: Some("zero".to_string()),
            cuisine_type: Some("Martian".to_string()),
            recipe_type: Some("veg".to_string()),
            difficulty: None,
        };

        let err = validate_recipe(&input).unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "name",
                "description",
                "ingredients",
                "steps",
                "servings",
                "cookingTime",
                "cuisineType",
                "recipeType",
                "difficulty"
            ]
        );
    }

    #[test]
    fn test_cooking_time_fits_the_stored_column() {
        let at_max = RecipeInput {
            cooking_time: Some(i32::MAX.to_string()),
            ..valid_input()
        };
        assert_eq!(
            validate_recipe(&at_max).unwrap().cooking_time,
            i32::MAX as u32
        );

        let too_long = RecipeInput {
            cooking_time: Some("3000000000".to_string()),
            ..valid_input()
        };
        let err = validate_recipe(&too_long).unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, "cookingTime");
    }

    #[test]
    fn test_whole_floats_count_as_integers() {
        let input = RecipeInput {
            servings: Some("4.0".to_string()),
            cooking_time: Some("45.0".to_string()),
            ..valid_input()
        };
        let fields = validate_recipe(&input).unwrap();
        assert_eq!(fields.servings, 4);
        assert_eq!(fields.cooking_time, 45);

        let fractional = RecipeInput {
            servings: Some("4.5".to_string()),
            ..valid_input()
        };
        let err = validate_recipe(&fractional).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "servings");
    }

    #[test]
    fn test_merge_overlays_only_provided_fields() {
        let patch = RecipeInput {
            servings: Some("6".to_string()),
            ..RecipeInput::default()
        };
        let merged = valid_input().merge(patch);
        assert_eq!(merged.servings.as_deref(), Some("6"));
        assert_eq!(merged.cuisine_type.as_deref(), Some("Italian"));
    }

    #[test]
    fn test_comment_bounds() {
        assert_eq!(validate_comment("  Lovely!  ").unwrap(), "Lovely!");
        assert!(validate_comment("   ").is_err());
        assert!(validate_comment(&"a".repeat(500)).is_ok());
        let err = validate_comment(&"a".repeat(501)).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "text");
    }
}
