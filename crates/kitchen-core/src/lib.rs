//! # Kitchen Core
//!
//! The domain layer of the KitchenCloud recipe service.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! recipe validation, search/pagination translation, upload gating, credential
//! guarding and the recipe lifecycle service.

pub mod domain;
pub mod error;
pub mod ports;
pub mod query;
pub mod services;
pub mod upload;
pub mod validation;

pub use error::{DomainError, FieldError, RepoError};
pub use services::{AuthGuard, RecipeListing, RecipeService};
