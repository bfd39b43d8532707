use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;

/// Returned when a label does not belong to a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Declares a closed enumeration whose wire and storage form is its label.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labelled_enum! {
    /// Cuisine a recipe belongs to.
    CuisineType {
        Indian => "Indian",
        Italian => "Italian",
        Chinese => "Chinese",
        Mexican => "Mexican",
        Thai => "Thai",
        American => "American",
        French => "French",
        Japanese => "Japanese",
        Mediterranean => "Mediterranean",
        Other => "Other",
    }
}

labelled_enum! {
    /// Dietary or course category.
    RecipeType {
        Veg => "Veg",
        NonVeg => "Non-Veg",
        Vegan => "Vegan",
        Dessert => "Dessert",
        Appetizer => "Appetizer",
        MainCourse => "Main Course",
        Beverage => "Beverage",
    }
}

labelled_enum! {
    Difficulty {
        Easy => "Easy",
        Medium => "Medium",
        Hard => "Hard",
    }
}

/// Validated, author-editable recipe content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: String,
    pub servings: u32,
    pub cooking_time: u32,
    pub cuisine_type: CuisineType,
    pub recipe_type: RecipeType,
    pub difficulty: Difficulty,
}

/// A comment appended to a recipe. Never edited once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Recipe entity - the published dish with its likes and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: String,
    pub image: Option<String>,
    pub servings: u32,
    pub cooking_time: u32,
    pub cuisine_type: CuisineType,
    pub recipe_type: RecipeType,
    pub difficulty: Difficulty,
    pub author: Uuid,
    pub likes: BTreeSet<Uuid>,
    pub likes_count: u32,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a new recipe owned by `author`, with no likes or comments.
    pub fn new(author: Uuid, fields: RecipeFields, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: fields.name,
            description: fields.description,
            ingredients: fields.ingredients,
            steps: fields.steps,
            image,
            servings: fields.servings,
            cooking_time: fields.cooking_time,
            cuisine_type: fields.cuisine_type,
            recipe_type: fields.recipe_type,
            difficulty: fields.difficulty,
            author,
            likes: BTreeSet::new(),
            likes_count: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author == user_id
    }

    pub fn fields(&self) -> RecipeFields {
        RecipeFields {
            name: self.name.clone(),
            description: self.description.clone(),
            ingredients: self.ingredients.clone(),
            steps: self.steps.clone(),
            servings: self.servings,
            cooking_time: self.cooking_time,
            cuisine_type: self.cuisine_type,
            recipe_type: self.recipe_type,
            difficulty: self.difficulty,
        }
    }

    /// Replace the editable content. `author`, likes and comments are untouched.
    pub fn apply(&mut self, fields: RecipeFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.ingredients = fields.ingredients;
        self.steps = fields.steps;
        self.servings = fields.servings;
        self.cooking_time = fields.cooking_time;
        self.cuisine_type = fields.cuisine_type;
        self.recipe_type = fields.recipe_type;
        self.difficulty = fields.difficulty;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Flip `user_id`'s membership in the like set. Returns whether the user now likes it.
    pub fn toggle_like(&mut self, user_id: Uuid) -> LikeOutcome {
        let liked = if self.likes.remove(&user_id) {
            false
        } else {
            self.likes.insert(user_id);
            true
        };
        self.recompute_likes_count();
        LikeOutcome {
            liked,
            likes_count: self.likes_count,
        }
    }

    pub fn recompute_likes_count(&mut self) {
        self.likes_count = self.likes.len() as u32;
    }
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: u32,
}

/// One page of recipes plus the total number of matches.
#[derive(Debug, Clone, Default)]
pub struct RecipePage {
    pub items: Vec<Recipe>,
    pub total: u64,
}

/// Commenter as displayed next to a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommenterSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<UserSummary> for CommenterSummary {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentDetails {
    pub comment: Comment,
    pub user: Option<CommenterSummary>,
}

/// A recipe with its author and commenters resolved for display.
///
/// References to users that no longer exist resolve to `None`.
#[derive(Debug, Clone)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub author: Option<UserSummary>,
    pub comments: Vec<CommentDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> RecipeFields {
        RecipeFields {
            name: "Pasta".to_string(),
            description: "A quick weeknight pasta".to_string(),
            ingredients: vec!["pasta".to_string()],
            steps: "Boil, drain, serve.".to_string(),
            servings: 2,
            cooking_time: 15,
            cuisine_type: CuisineType::Italian,
            recipe_type: RecipeType::MainCourse,
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn test_labels_round_trip() {
        assert_eq!("Main Course".parse::<RecipeType>(), Ok(RecipeType::MainCourse));
        assert_eq!(RecipeType::NonVeg.as_str(), "Non-Veg");
        assert!("italian".parse::<CuisineType>().is_err());
        assert_eq!(CuisineType::ALL.len(), 10);
        assert_eq!(
            serde_json::to_string(&RecipeType::MainCourse).unwrap(),
            "\"Main Course\""
        );
    }

    #[test]
    fn test_toggle_like_is_an_involution() {
        let mut recipe = Recipe::new(Uuid::new_v4(), fields(), None);
        let user = Uuid::new_v4();

        let first = recipe.toggle_like(user);
        assert!(first.liked);
        assert_eq!(first.likes_count, 1);

        let second = recipe.toggle_like(user);
        assert!(!second.liked);
        assert_eq!(second.likes_count, 0);
        assert_eq!(recipe.likes_count as usize, recipe.likes.len());
    }

    #[test]
    fn test_apply_keeps_ownership_and_likes() {
        let author = Uuid::new_v4();
        let mut recipe = Recipe::new(author, fields(), Some("a.png".to_string()));
        recipe.toggle_like(Uuid::new_v4());

        let mut changed = fields();
        changed.name = "Better Pasta".to_string();
        recipe.apply(changed);

        assert_eq!(recipe.name, "Better Pasta");
        assert!(recipe.is_owned_by(author));
        assert_eq!(recipe.likes_count, 1);
        assert_eq!(recipe.image.as_deref(), Some("a.png"));
    }
}
