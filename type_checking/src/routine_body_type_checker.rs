use crate::{checker::SemanticContext, errors::SemanticError};
use ast::{BinaryOp, Elsif, Expr, ExprKind, Stmt, StmtKind, StmtList};
use srcpos::{Position, Spanned};
use symtab::{SymIndex, SymbolTag, INTEGER_TYPE, REAL_TYPE, VOID_TYPE};

/// Checks one routine body. Lists (statements, arguments, elsif clauses) are
/// walked from their last element to their first.
pub struct RoutineBodyTypeChecker<'a, 'ctx> {
    context: &'a SemanticContext<'ctx>,
    seen_return: bool,
}

impl<'a, 'ctx> RoutineBodyTypeChecker<'a, 'ctx> {
    pub fn new(context: &'a SemanticContext<'ctx>) -> Self {
        RoutineBodyTypeChecker {
            context,
            seen_return: false,
        }
    }

    /// Whether any `return` statement was checked so far.
    pub fn seen_return(&self) -> bool {
        self.seen_return
    }

    pub fn check_stmt_list(&mut self, list: &mut StmtList) {
        for stmt in list.stmts.iter_mut().rev() {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        let pos = stmt.pos;
        match &mut stmt.kind {
            StmtKind::Assign { lhs, rhs } => {
                let lhs_type = self.type_expr(lhs);
                let rhs_type = self.type_expr(rhs);

                if lhs_type == rhs_type {
                    return;
                }
                if lhs_type == REAL_TYPE && rhs_type == INTEGER_TYPE {
                    insert_cast(rhs);
                } else {
                    self.context.report_error(
                        pos,
                        SemanticError::AssignmentMismatch {
                            lhs: self.context.type_name(lhs_type),
                            rhs: self.context.type_name(rhs_type),
                        },
                    );
                }
            }
            StmtKind::While { condition, body } => {
                if self.type_expr(condition) != INTEGER_TYPE {
                    self.context
                        .report_error(condition.pos, SemanticError::WhilePredicateNotInteger);
                }
                self.check_stmt_list(body);
            }
            StmtKind::If {
                condition,
                body,
                elsifs,
                else_body,
            } => {
                let condition_type = self.type_expr(condition);
                self.check_stmt_list(body);
                if condition_type != INTEGER_TYPE {
                    self.context
                        .report_error(condition.pos, SemanticError::IfPredicateNotInteger);
                }

                self.check_elsifs(elsifs);
                if let Some(else_body) = else_body {
                    self.check_stmt_list(else_body);
                }
            }
            StmtKind::Return { value } => self.check_return(pos, value.as_mut()),
            StmtKind::ProcedureCall { callee, args } => {
                self.check_parameters(callee, args);
            }
        }
    }

    fn check_elsifs(&mut self, elsifs: &mut [Elsif]) {
        for elsif in elsifs.iter_mut().rev() {
            self.check_stmt_list(&mut elsif.body);
            self.type_expr(&mut elsif.condition);
            self.check_elsif_condition(elsif);
        }
    }

    /// Looks at the type already stored in the condition, it does not
    /// synthesize it again.
    fn check_elsif_condition(&self, elsif: &Elsif) {
        if elsif.condition.ty != INTEGER_TYPE {
            self.context.report_error(
                elsif.condition.pos,
                SemanticError::ElsifConditionNotInteger,
            );
        }
    }

    fn check_return(&mut self, pos: Position, value: Option<&mut Expr>) {
        self.seen_return = true;

        let symtab = self.context.symtab;
        let env = symtab.get_symbol(symtab.current_environment());
        let value = match value {
            None => {
                if env.tag != SymbolTag::Proc {
                    self.context
                        .report_error(pos, SemanticError::ReturnValueRequired);
                }
                return;
            }
            Some(value) => value,
        };

        let value_type = self.type_expr(value);
        if env.tag != SymbolTag::Func {
            self.context
                .report_error(pos, SemanticError::ProcedureReturnsValue);
        } else if env.ty != value_type {
            // no implicit widening here, unlike assignments
            self.context
                .report_error(value.pos, SemanticError::BadReturnType);
        }
    }

    /// Synthesizes the type of `expr`, stores it in `expr.ty` and returns it.
    ///
    /// The stored and the returned type differ in two places: an identifier
    /// naming a type returns the type symbol itself, and the integer-only
    /// operators store `integer` even when they report an error.
    fn type_expr(&mut self, expr: &mut Expr) -> SymIndex {
        let pos = expr.pos;
        let symtab = self.context.symtab;

        let (stored, synthesized) = match &mut expr.kind {
            ExprKind::Id(sym) => {
                let symbol = symtab.get_symbol(*sym);
                if symbol.tag == SymbolTag::NameType {
                    (symbol.ty, *sym)
                } else {
                    (symbol.ty, symbol.ty)
                }
            }
            ExprKind::Indexed { array, index } => {
                let element_type = symtab.get_symbol(array.data).ty;
                let index_type = self.type_expr(index);
                if index_type != INTEGER_TYPE {
                    self.context.report_error(
                        pos,
                        SemanticError::IndexNotInteger {
                            array: symtab.get_symbol(array.data).name.clone(),
                            found: self.context.type_name(index_type),
                        },
                    );
                }
                (element_type, element_type)
            }
            ExprKind::Integer(_) => (INTEGER_TYPE, INTEGER_TYPE),
            ExprKind::Real(_) => (REAL_TYPE, REAL_TYPE),
            ExprKind::Cast(inner) => {
                self.type_expr(inner);
                (REAL_TYPE, REAL_TYPE)
            }
            ExprKind::UnaryMinus(inner) => {
                let ty = self.type_expr(inner);
                (ty, ty)
            }
            ExprKind::Not(inner) => {
                self.type_expr(inner);
                if inner.ty == INTEGER_TYPE {
                    (INTEGER_TYPE, INTEGER_TYPE)
                } else {
                    self.context
                        .report_error(inner.pos, SemanticError::NegatedNotInteger);
                    (VOID_TYPE, VOID_TYPE)
                }
            }
            ExprKind::FunctionCall { callee, args } => {
                self.check_parameters(callee, args);
                let ty = symtab.get_symbol(callee.data).ty;
                (ty, ty)
            }
            ExprKind::Binary { op, left, right } => match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mult => {
                    let ty = self.check_arithmetic(left, right);
                    (ty, ty)
                }
                BinaryOp::Divide => {
                    let ty = self.check_divide(left, right);
                    (ty, ty)
                }
                BinaryOp::Or | BinaryOp::And | BinaryOp::Idiv | BinaryOp::Mod => {
                    let ty = self.check_integer_operation(pos, *op, left, right);
                    (INTEGER_TYPE, ty)
                }
            },
            ExprKind::Relation { left, right, .. } => {
                (INTEGER_TYPE, self.check_relation(left, right))
            }
        };

        expr.ty = stored;
        synthesized
    }

    /// `+`, `-` and `*`: mixing integer and real widens the integer side.
    /// Any other combination synthesizes `void` without an error.
    fn check_arithmetic(&mut self, left: &mut Expr, right: &mut Expr) -> SymIndex {
        let lhs_type = self.type_expr(left);
        let rhs_type = self.type_expr(right);

        if lhs_type == INTEGER_TYPE && rhs_type == INTEGER_TYPE {
            INTEGER_TYPE
        } else if lhs_type == REAL_TYPE && rhs_type == REAL_TYPE {
            REAL_TYPE
        } else if lhs_type == INTEGER_TYPE {
            insert_cast(left);
            REAL_TYPE
        } else if rhs_type == INTEGER_TYPE {
            insert_cast(right);
            REAL_TYPE
        } else {
            VOID_TYPE
        }
    }

    /// `/` is always real, integer operands are widened independently.
    fn check_divide(&mut self, left: &mut Expr, right: &mut Expr) -> SymIndex {
        self.type_expr(left);
        self.type_expr(right);

        if left.ty == INTEGER_TYPE {
            insert_cast(left);
        }
        if right.ty == INTEGER_TYPE {
            insert_cast(right);
        }
        REAL_TYPE
    }

    /// `or`, `and`, `div` and `mod`.
    ///
    /// An integer left operand next to a real right operand is widened and
    /// accepted. The mirrored case (real left, integer right) is not and ends
    /// up as an error, as does every other mix.
    fn check_integer_operation(
        &mut self,
        pos: Position,
        op: BinaryOp,
        left: &mut Expr,
        right: &mut Expr,
    ) -> SymIndex {
        let lhs_type = self.type_expr(left);
        let rhs_type = self.type_expr(right);

        if lhs_type == INTEGER_TYPE && rhs_type == INTEGER_TYPE {
            return INTEGER_TYPE;
        }
        if lhs_type == INTEGER_TYPE && rhs_type == REAL_TYPE {
            insert_cast(left);
            return INTEGER_TYPE;
        }

        self.context.report_error(
            pos,
            SemanticError::IntegerOperandsExpected {
                op: operator_name(op),
            },
        );
        VOID_TYPE
    }

    /// Relations compare as integers. A single integer side is widened but
    /// the relation still synthesizes `integer`; two non-integer sides give
    /// `void` and no error.
    fn check_relation(&mut self, left: &mut Expr, right: &mut Expr) -> SymIndex {
        let lhs_type = self.type_expr(left);
        let rhs_type = self.type_expr(right);

        if lhs_type == INTEGER_TYPE && rhs_type == INTEGER_TYPE {
            INTEGER_TYPE
        } else if lhs_type == INTEGER_TYPE {
            insert_cast(left);
            INTEGER_TYPE
        } else if rhs_type == INTEGER_TYPE {
            insert_cast(right);
            INTEGER_TYPE
        } else {
            VOID_TYPE
        }
    }

    fn check_parameters(&mut self, callee: &Spanned<SymIndex>, args: &mut [Expr]) {
        for arg in args.iter_mut().rev() {
            self.type_expr(arg);
        }

        let symtab = self.context.symtab;
        let routine = symtab.get_symbol(callee.data);
        if !self.match_params(callee.pos, &routine.params, args) {
            log::debug!("call of '{}' at {} does not match", routine.name, callee.pos);
        }
    }

    /// Compares formals and actuals pairwise, starting with the last ones.
    /// An integer actual for a real formal is widened in place.
    fn match_params(&self, pos: Position, formals: &[SymIndex], actuals: &mut [Expr]) -> bool {
        match (formals.split_last(), actuals.split_last_mut()) {
            (None, None) => true,
            (None, Some(_)) | (Some(_), None) => {
                self.context
                    .report_error(pos, SemanticError::InvalidParameterCount);
                false
            }
            (Some((formal, formals)), Some((actual, actuals))) => {
                let formal_type = self.context.symtab.get_symbol(*formal).ty;

                if formal_type == actual.ty {
                    self.match_params(pos, formals, actuals)
                } else if formal_type == REAL_TYPE && actual.ty == INTEGER_TYPE {
                    insert_cast(actual);
                    self.match_params(pos, formals, actuals)
                } else if formal_type == INTEGER_TYPE && actual.ty != INTEGER_TYPE {
                    self.context
                        .report_error(pos, SemanticError::ParameterTypeDiscrepancy);
                    false
                } else {
                    false
                }
            }
        }
    }
}

fn insert_cast(expr: &mut Expr) {
    log::debug!("widening expression at {} to real", expr.pos);
    expr.widen_to_real();
}

fn operator_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Or => "OR",
        BinaryOp::And => "AND",
        BinaryOp::Idiv => "IDIV",
        BinaryOp::Mod => "MOD",
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mult | BinaryOp::Divide => {
            unreachable!("not an integer-only operator: {}", op)
        }
    }
}
