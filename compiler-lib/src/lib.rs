#![warn(rust_2018_idioms)]
#![warn(clippy::print_stdout)]

//! Runs type checking and constant folding over the routines of a program
//! and reports the result.
pub mod driver;
pub mod program;

pub use ast;
pub use compiler_shared::context;
pub use diagnostics;
pub use optimization;
pub use symtab;
pub use type_checking;

pub use self::program::{Program, Routine};
