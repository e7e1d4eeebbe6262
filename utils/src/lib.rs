//! Test helpers shared by the workspace crates.

/// Asserts that an expression matches a pattern and prints the expression
/// with its location if it does not.
#[macro_export]
macro_rules! assert_matches {
    ($expression: expr, $( $pattern: pat )|*) => {{
        match $expression {
            $( $pattern )|* => (),
            expression => panic!(
                r#"assertion failed: `(if let pattern = expression), {}:{}:{}`
pattern: `{}`,
expression: `{:?}`"#,
                file!(),
                line!(),
                column!(),
                stringify!($( $pattern )|*),
                expression
            ),
        }
    }};
}
