use diagnostics::Printable;
use failure::Fail;
use srcpos::MaybeSpanned;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Fail)]
pub enum SemanticError {
    #[fail(
        display = "array index must be of type integer, found {} (array {})",
        found, array
    )]
    IndexNotInteger { array: String, found: String },
    #[fail(
        display = "invalid condition in {}-statement, all variables must be int",
        op
    )]
    IntegerOperandsExpected { op: &'static str },
    #[fail(display = "negated expr must be of type integer")]
    NegatedNotInteger,
    #[fail(
        display = "lhs and rhs must be of same type in assignment. lhs: {} rhs: {}",
        lhs, rhs
    )]
    AssignmentMismatch { lhs: String, rhs: String },
    #[fail(display = "while predicate must be of integer type.")]
    WhilePredicateNotInteger,
    #[fail(display = "if predicate must be of integer type.")]
    IfPredicateNotInteger,
    #[fail(display = "Condition is not of type integer.")]
    ElsifConditionNotInteger,
    #[fail(display = "Must return a value from a function.")]
    ReturnValueRequired,
    #[fail(display = "Procedures may not return a value.")]
    ProcedureReturnsValue,
    #[fail(display = "Bad return type from function.")]
    BadReturnType,
    #[fail(display = "A function must return a value.")]
    MissingReturn,
    #[fail(display = "Invalid number of parameters")]
    InvalidParameterCount,
    #[fail(display = "Type discrepancy between formal and actual parameters.")]
    ParameterTypeDiscrepancy,
}

impl<'b> Printable<'b> for SemanticError {
    fn as_maybe_spanned(&'b self) -> MaybeSpanned<&'b dyn fmt::Display> {
        MaybeSpanned::WithoutSpan(self)
    }
}
