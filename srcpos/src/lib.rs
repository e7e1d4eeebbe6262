//! Source positions as handed to us by the parser. The passes never look at
//! source text, so a position is just a line/column pair that travels with
//! every AST node and ends up in diagnostics.
pub mod maybe_spanned;
pub mod position;
pub mod spanned;

pub use self::{maybe_spanned::MaybeSpanned, position::Position, spanned::Spanned};
