//! Type checking of routine bodies.
//!
//! The checker walks a body once, synthesizes a type for every expression,
//! inserts casts where an integer is widened to real, and reports type errors
//! to the diagnostics of the given context. It never aborts: after an error
//! a best-effort type (usually `void`) is synthesized and checking goes on.
#![warn(rust_2018_idioms)]

mod checker;
mod errors;
mod routine_body_type_checker;

pub use self::{
    checker::{typecheck, SemanticContext},
    errors::SemanticError,
};
