//! Constant folding on routine bodies.
//!
//! Every statement and expression that owns a child which may be constant
//! first optimizes that child and then folds it, storing the result back into
//! the slot. Binary operations do nothing on their own: they are folded by
//! whoever holds them. Consequences worth knowing:
//!
//! - arguments of calls are optimized but never folded, so `f(1 + 2)` stays;
//! - a relation folds each operand but never collapses into a literal;
//! - identifiers are never replaced by the value of a named constant;
//! - `div` folds with real division.
use super::{Local, Outcome};
use ast::{BinaryOp, Elsif, Expr, ExprKind, Stmt, StmtKind, StmtList};
use srcpos::Position;
use symtab::{SymIndex, INTEGER_TYPE, REAL_TYPE};

pub struct ConstantFolding {
    // number of subtrees replaced by a literal
    folded: usize,
}

impl Local for ConstantFolding {
    fn optimize_body(body: &mut StmtList) -> Outcome {
        let mut constant_folding = ConstantFolding::new();
        constant_folding.optimize_stmt_list(body);
        log::debug!(
            "constant folding replaced {} subtree(s)",
            constant_folding.folded
        );
        constant_folding.outcome()
    }
}

/// Folds the constant subexpressions of `body` in place.
pub fn optimize(body: &mut StmtList) -> Outcome {
    ConstantFolding::optimize_body(body)
}

/// Folds a single expression. Returns the expression unchanged if it is not
/// a foldable binary operation (or an array access whose index is one).
pub fn fold_constants(expr: Expr) -> Expr {
    ConstantFolding::new().fold_constants(expr)
}

/// The arithmetic behind each operator. `div` shares the real division of
/// `/`, so `fold_function(BinaryOp::Idiv)(7.0, 2.0)` is `3.5`.
pub fn fold_function(op: BinaryOp) -> fn(f64, f64) -> f64 {
    match op {
        BinaryOp::Add => fold_add,
        BinaryOp::Sub => fold_sub,
        BinaryOp::Mult => fold_mult,
        BinaryOp::Divide | BinaryOp::Idiv => fold_div,
        BinaryOp::Or => fold_or,
        BinaryOp::And => fold_and,
        BinaryOp::Mod => fold_mod,
    }
}

fn fold_add(a: f64, b: f64) -> f64 {
    a + b
}

fn fold_sub(a: f64, b: f64) -> f64 {
    a - b
}

fn fold_mult(a: f64, b: f64) -> f64 {
    a * b
}

fn fold_div(a: f64, b: f64) -> f64 {
    a / b
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn fold_or(a: f64, b: f64) -> f64 {
    truth(a != 0.0 || b != 0.0)
}

fn fold_and(a: f64, b: f64) -> f64 {
    truth(a != 0.0 && b != 0.0)
}

/// Both operands are truncated to integers first. A zero divisor gives NaN.
fn fold_mod(a: f64, b: f64) -> f64 {
    (a as i64)
        .checked_rem(b as i64)
        .map_or(std::f64::NAN, |rem| rem as f64)
}

/// 2^53. Above it `f64` cannot represent every integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Whether truncating `value` gives the exact integer. False for NaN and
/// infinities.
fn within_exact_range(value: f64) -> bool {
    value.abs() < EXACT_INTEGER_LIMIT
}

impl ConstantFolding {
    fn new() -> Self {
        ConstantFolding { folded: 0 }
    }

    fn outcome(&self) -> Outcome {
        if self.folded > 0 {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }

    fn optimize_stmt_list(&mut self, list: &mut StmtList) {
        for stmt in &mut list.stmts {
            self.optimize_stmt(stmt);
        }
    }

    fn optimize_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            // the target of an assignment is left alone, even an index
            StmtKind::Assign { rhs, .. } => self.optimize_and_fold(rhs),
            StmtKind::While { condition, body } => {
                self.optimize_and_fold(condition);
                self.optimize_stmt_list(body);
            }
            StmtKind::If {
                condition,
                body,
                elsifs,
                else_body,
            } => {
                self.optimize_and_fold(condition);
                self.optimize_stmt_list(body);
                for elsif in elsifs {
                    self.optimize_elsif(elsif);
                }
                if let Some(else_body) = else_body {
                    self.optimize_stmt_list(else_body);
                }
            }
            StmtKind::Return { value } => {
                if let Some(value) = value {
                    self.optimize_and_fold(value);
                }
            }
            StmtKind::ProcedureCall { args, .. } => self.optimize_args(args),
        }
    }

    /// The condition is folded only after the body was optimized.
    fn optimize_elsif(&mut self, elsif: &mut Elsif) {
        self.optimize_expr(&mut elsif.condition);
        self.optimize_stmt_list(&mut elsif.body);
        self.fold_in_place(&mut elsif.condition);
    }

    fn optimize_args(&mut self, args: &mut [Expr]) {
        for arg in args {
            self.optimize_expr(arg);
        }
    }

    fn optimize_expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Indexed { index, .. } => self.fold_in_place(index),
            ExprKind::UnaryMinus(inner) | ExprKind::Not(inner) => self.optimize_and_fold(inner),
            ExprKind::FunctionCall { args, .. } => self.optimize_args(args),
            ExprKind::Relation { left, right, .. } => {
                self.optimize_and_fold(left);
                self.optimize_and_fold(right);
            }
            // folded by the parent
            ExprKind::Binary { .. } => {}
            ExprKind::Id(_) | ExprKind::Integer(_) | ExprKind::Real(_) | ExprKind::Cast(_) => {}
        }
    }

    fn optimize_and_fold(&mut self, slot: &mut Expr) {
        self.optimize_expr(slot);
        self.fold_in_place(slot);
    }

    fn fold_in_place(&mut self, slot: &mut Expr) {
        slot.replace_with(|expr| self.fold_constants(expr));
    }

    fn fold_constants(&mut self, expr: Expr) -> Expr {
        let Expr { pos, ty, kind } = expr;
        let kind = match kind {
            ExprKind::Binary { op, left, right } => {
                let left = self.fold_constants(*left);
                let right = self.fold_constants(*right);
                return self.fold_binop(pos, ty, op, left, right);
            }
            ExprKind::Indexed { array, index } => ExprKind::Indexed {
                array,
                index: Box::new(self.fold_constants(*index)),
            },
            // identifiers stay, even if they name a constant
            other => other,
        };
        Expr { pos, ty, kind }
    }

    /// Produces a literal if both operands are literals of the operation's
    /// own type, otherwise rebuilds the operation from the folded operands.
    fn fold_binop(
        &mut self,
        pos: Position,
        ty: SymIndex,
        op: BinaryOp,
        left: Expr,
        right: Expr,
    ) -> Expr {
        let fold = fold_function(op);

        match (&left.kind, &right.kind) {
            (ExprKind::Integer(a), ExprKind::Integer(b)) if ty == INTEGER_TYPE => {
                let (a, b) = (*a as f64, *b as f64);
                // division or modulo by zero, overflow or lost precision:
                // leave it to run time
                if within_exact_range(a) && within_exact_range(b) {
                    let value = fold(a, b);
                    if within_exact_range(value) {
                        self.folded += 1;
                        return Expr::integer(pos, value as i64);
                    }
                }
            }
            (ExprKind::Real(a), ExprKind::Real(b)) if ty == REAL_TYPE => {
                self.folded += 1;
                return Expr::real(pos, fold(*a, *b));
            }
            _ => {}
        }

        Expr {
            pos,
            ty,
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }
}
