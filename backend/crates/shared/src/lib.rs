//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - The unified error type and its HTTP rendering
//! - Typed ID wrappers
//! - Pagination envelope for list endpoints

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
    pub mod validation;
}
pub mod id;
pub mod pagination;
