//! The abstract syntax tree of routine bodies as produced by the parser.
//!
//! Nodes own their children, so the semantic passes rewrite the tree by
//! replacing a child in its slot (inserting a cast, substituting a folded
//! literal). Every expression carries the type synthesized for it by the
//! type checker; until then it is `void` (or the literal's own type).
pub mod print;
mod walk;

use serde_derive::{Deserialize, Serialize};
use srcpos::{Position, Spanned};
use std::{fmt, mem};
use symtab::{SymIndex, INTEGER_TYPE, REAL_TYPE, VOID_TYPE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UncheckedExpr")]
pub struct Expr {
    pub pos: Position,
    pub ty: SymIndex,
    pub kind: ExprKind,
}

/// The serialized form of an expression, whose type may be omitted. A missing
/// type is filled in as by `Expr::new`.
#[derive(Deserialize)]
struct UncheckedExpr {
    pos: Position,
    #[serde(default)]
    ty: Option<SymIndex>,
    kind: ExprKind,
}

impl From<UncheckedExpr> for Expr {
    fn from(expr: UncheckedExpr) -> Self {
        match expr.ty {
            Some(ty) => Expr {
                pos: expr.pos,
                ty,
                kind: expr.kind,
            },
            None => Expr::new(expr.pos, expr.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Id(SymIndex),
    Indexed {
        array: Spanned<SymIndex>,
        index: Box<Expr>,
    },
    Integer(i64),
    Real(f64),
    /// Widening of an integer expression to real. Only ever inserted by the
    /// type checker, never written by the programmer.
    Cast(Box<Expr>),
    UnaryMinus(Box<Expr>),
    Not(Box<Expr>),
    FunctionCall {
        callee: Spanned<SymIndex>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Relation {
        op: RelOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mult,
    Divide,
    Idiv,
    Mod,
    Or,
    And,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOp {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::BinaryOp::*;
        let op = match self {
            Add => "+",
            Sub => "-",
            Mult => "*",
            Divide => "/",
            Idiv => "div",
            Mod => "mod",
            Or => "or",
            And => "and",
        };
        write!(f, "{}", op)
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            RelOp::Equal => "=",
            RelOp::NotEqual => "<>",
            RelOp::LessThan => "<",
            RelOp::GreaterThan => ">",
        };
        write!(f, "{}", op)
    }
}

impl Expr {
    pub fn new(pos: Position, kind: ExprKind) -> Self {
        let ty = match kind {
            ExprKind::Integer(_) => INTEGER_TYPE,
            ExprKind::Real(_) | ExprKind::Cast(_) => REAL_TYPE,
            _ => VOID_TYPE,
        };
        Expr { pos, ty, kind }
    }

    pub fn id(pos: Position, sym: SymIndex) -> Self {
        Expr::new(pos, ExprKind::Id(sym))
    }

    pub fn indexed(pos: Position, array: SymIndex, index: Expr) -> Self {
        Expr::new(
            pos,
            ExprKind::Indexed {
                array: Spanned::new(pos, array),
                index: Box::new(index),
            },
        )
    }

    pub fn integer(pos: Position, value: i64) -> Self {
        Expr::new(pos, ExprKind::Integer(value))
    }

    pub fn real(pos: Position, value: f64) -> Self {
        Expr::new(pos, ExprKind::Real(value))
    }

    pub fn cast(pos: Position, expr: Expr) -> Self {
        Expr::new(pos, ExprKind::Cast(Box::new(expr)))
    }

    pub fn uminus(pos: Position, expr: Expr) -> Self {
        Expr::new(pos, ExprKind::UnaryMinus(Box::new(expr)))
    }

    pub fn not(pos: Position, expr: Expr) -> Self {
        Expr::new(pos, ExprKind::Not(Box::new(expr)))
    }

    pub fn call(pos: Position, callee: SymIndex, args: Vec<Expr>) -> Self {
        Expr::new(
            pos,
            ExprKind::FunctionCall {
                callee: Spanned::new(pos, callee),
                args,
            },
        )
    }

    pub fn binary(pos: Position, op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::new(
            pos,
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    pub fn relation(pos: Position, op: RelOp, left: Expr, right: Expr) -> Self {
        Expr::new(
            pos,
            ExprKind::Relation {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    /// Replaces this expression by `f(self)` without cloning the subtree.
    pub fn replace_with<F>(&mut self, f: F)
    where
        F: FnOnce(Expr) -> Expr,
    {
        let pos = self.pos;
        let old = mem::replace(self, Expr::integer(pos, 0));
        *self = f(old);
    }

    /// Wraps this expression into a cast to real, in place. The cast takes
    /// over the position of the wrapped expression.
    pub fn widen_to_real(&mut self) {
        self.replace_with(|inner| Expr::cast(inner.pos, inner));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub pos: Position,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `lhs` is an identifier or an indexed array access.
    Assign { lhs: Expr, rhs: Expr },
    If {
        condition: Expr,
        body: StmtList,
        #[serde(default)]
        elsifs: Vec<Elsif>,
        #[serde(default)]
        else_body: Option<StmtList>,
    },
    While { condition: Expr, body: StmtList },
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
    ProcedureCall {
        callee: Spanned<SymIndex>,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elsif {
    pub pos: Position,
    pub condition: Expr,
    pub body: StmtList,
}

impl Stmt {
    pub fn assign(pos: Position, lhs: Expr, rhs: Expr) -> Self {
        Stmt {
            pos,
            kind: StmtKind::Assign { lhs, rhs },
        }
    }

    pub fn if_stmt(
        pos: Position,
        condition: Expr,
        body: StmtList,
        elsifs: Vec<Elsif>,
        else_body: Option<StmtList>,
    ) -> Self {
        Stmt {
            pos,
            kind: StmtKind::If {
                condition,
                body,
                elsifs,
                else_body,
            },
        }
    }

    pub fn while_stmt(pos: Position, condition: Expr, body: StmtList) -> Self {
        Stmt {
            pos,
            kind: StmtKind::While { condition, body },
        }
    }

    pub fn return_stmt(pos: Position, value: Option<Expr>) -> Self {
        Stmt {
            pos,
            kind: StmtKind::Return { value },
        }
    }

    pub fn procedure_call(pos: Position, callee: SymIndex, args: Vec<Expr>) -> Self {
        Stmt {
            pos,
            kind: StmtKind::ProcedureCall {
                callee: Spanned::new(pos, callee),
                args,
            },
        }
    }
}

impl Elsif {
    pub fn new(pos: Position, condition: Expr, body: StmtList) -> Self {
        Elsif {
            pos,
            condition,
            body,
        }
    }
}

/// Statements in source order. An empty list stands for a missing body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StmtList {
    pub stmts: Vec<Stmt>,
}

impl StmtList {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        StmtList { stmts }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    /// A list is located where its most recently added statement is.
    pub fn pos(&self) -> Option<Position> {
        self.stmts.last().map(|stmt| stmt.pos)
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }
}

impl From<Vec<Stmt>> for StmtList {
    fn from(stmts: Vec<Stmt>) -> Self {
        StmtList::new(stmts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils::assert_matches;

    fn pos(line: u32) -> Position {
        Position::new(line, 1)
    }

    #[test]
    fn literals_start_out_typed() {
        assert_eq!(INTEGER_TYPE, Expr::integer(pos(1), 4).ty);
        assert_eq!(REAL_TYPE, Expr::real(pos(1), 0.5).ty);
        assert_eq!(VOID_TYPE, Expr::id(pos(1), SymIndex(7)).ty);
    }

    #[test]
    fn widening_wraps_in_place() {
        let mut args = vec![Expr::integer(pos(1), 1), Expr::integer(pos(2), 2)];
        args[1].widen_to_real();

        assert_matches!(&args[0].kind, ExprKind::Integer(1));
        assert_eq!(REAL_TYPE, args[1].ty);
        assert_eq!(pos(2), args[1].pos);
        match &args[1].kind {
            ExprKind::Cast(inner) => assert_matches!(&inner.kind, ExprKind::Integer(2)),
            other => panic!("expected a cast, got {:?}", other),
        }
    }

    #[test]
    fn list_position_is_that_of_the_last_statement() {
        let list = StmtList::new(vec![
            Stmt::return_stmt(pos(3), None),
            Stmt::return_stmt(pos(5), None),
        ]);
        assert_eq!(Some(pos(5)), list.pos());
        assert_eq!(None, StmtList::empty().pos());
    }

    #[test]
    fn types_default_to_void_when_deserialized() {
        let json = r#"{"pos":{"line":1,"column":2},"kind":{"Id":5}}"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        assert_eq!(VOID_TYPE, expr.ty);
        assert_matches!(expr.kind, ExprKind::Id(SymIndex(5)));
    }

    #[test]
    fn deserialized_literals_start_out_typed() {
        let integer: Expr =
            serde_json::from_str(r#"{"pos":{"line":1,"column":2},"kind":{"Integer":4}}"#).unwrap();
        assert_eq!(Expr::integer(Position::new(1, 2), 4), integer);
        assert_eq!(INTEGER_TYPE, integer.ty);

        let real: Expr =
            serde_json::from_str(r#"{"pos":{"line":3,"column":1},"kind":{"Real":0.5}}"#).unwrap();
        assert_eq!(REAL_TYPE, real.ty);
    }

    #[test]
    fn explicit_types_survive_deserialization() {
        let json = r#"{"pos":{"line":1,"column":1},"ty":2,"kind":{"Id":5}}"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        assert_eq!(REAL_TYPE, expr.ty);
    }
}
