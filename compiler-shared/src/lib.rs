//! State handed through every pass of a compilation.
#![warn(clippy::print_stdout, clippy::use_self, clippy::use_debug)]

pub mod context;
