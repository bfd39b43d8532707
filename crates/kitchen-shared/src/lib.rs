//! # Kitchen Shared
//!
//! Wire types of the KitchenCloud recipe API, shared by the server and any
//! Rust client. JSON field names are camelCase.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldErrorDto, MessageResponse, PaginatedResponse};
