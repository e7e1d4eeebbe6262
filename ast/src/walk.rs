//! Read-only traversal of the symbol references in a tree.
use crate::{Expr, ExprKind, Stmt, StmtKind, StmtList};
use symtab::SymIndex;

impl StmtList {
    /// Calls `f` for every symbol referenced by an identifier, array access
    /// or call in this list, in source order.
    pub fn for_each_symbol<F: FnMut(SymIndex)>(&self, f: &mut F) {
        for stmt in &self.stmts {
            stmt.for_each_symbol(f);
        }
    }
}

impl Stmt {
    pub fn for_each_symbol<F: FnMut(SymIndex)>(&self, f: &mut F) {
        match &self.kind {
            StmtKind::Assign { lhs, rhs } => {
                lhs.for_each_symbol(f);
                rhs.for_each_symbol(f);
            }
            StmtKind::If {
                condition,
                body,
                elsifs,
                else_body,
            } => {
                condition.for_each_symbol(f);
                body.for_each_symbol(f);
                for elsif in elsifs {
                    elsif.condition.for_each_symbol(f);
                    elsif.body.for_each_symbol(f);
                }
                if let Some(else_body) = else_body {
                    else_body.for_each_symbol(f);
                }
            }
            StmtKind::While { condition, body } => {
                condition.for_each_symbol(f);
                body.for_each_symbol(f);
            }
            StmtKind::Return { value } => {
                if let Some(value) = value {
                    value.for_each_symbol(f);
                }
            }
            StmtKind::ProcedureCall { callee, args } => {
                f(callee.data);
                args.iter().for_each(|arg| arg.for_each_symbol(f));
            }
        }
    }
}

impl Expr {
    pub fn for_each_symbol<F: FnMut(SymIndex)>(&self, f: &mut F) {
        match &self.kind {
            ExprKind::Id(sym) => f(*sym),
            ExprKind::Indexed { array, index } => {
                f(array.data);
                index.for_each_symbol(f);
            }
            ExprKind::Integer(_) | ExprKind::Real(_) => {}
            ExprKind::Cast(inner) | ExprKind::UnaryMinus(inner) | ExprKind::Not(inner) => {
                inner.for_each_symbol(f)
            }
            ExprKind::FunctionCall { callee, args } => {
                f(callee.data);
                args.iter().for_each(|arg| arg.for_each_symbol(f));
            }
            ExprKind::Binary { left, right, .. } | ExprKind::Relation { left, right, .. } => {
                left.for_each_symbol(f);
                right.for_each_symbol(f);
            }
        }
    }
}
