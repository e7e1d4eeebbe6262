use crate::{errors::SemanticError, routine_body_type_checker::RoutineBodyTypeChecker};
use ast::StmtList;
use compiler_shared::context::Context;
use diagnostics::MessageLevel;
use srcpos::{Position, Spanned};
use symtab::{SymIndex, SymbolTable, SymbolTag};

/// Type checks the body of the routine `env`.
///
/// The body is mutated in place: expression types are filled in and casts
/// are inserted. Errors go to `context.diagnostics`. Besides the checks on
/// the individual statements, a function body must contain at least one
/// `return` statement.
pub fn typecheck(context: &Context, symtab: &SymbolTable, env: SymIndex, body: &mut StmtList) {
    let sem_context = SemanticContext::new(context, symtab);
    let routine = symtab.get_symbol(env);
    let errors_before = context.diagnostics.count(MessageLevel::Error);
    log::debug!(
        "type checking {} '{}' ({} statements)",
        routine.tag,
        routine.name,
        body.len()
    );

    let mut checker = RoutineBodyTypeChecker::new(&sem_context);
    if !body.is_empty() {
        checker.check_stmt_list(body);
    }

    if routine.tag == SymbolTag::Func && !checker.seen_return() {
        match body.pos() {
            Some(pos) => sem_context.report_error(pos, SemanticError::MissingReturn),
            None => sem_context.report_error_without_position(SemanticError::MissingReturn),
        }
    }

    log::debug!(
        "'{}' checked with {} new error(s)",
        routine.name,
        context.diagnostics.count(MessageLevel::Error) - errors_before
    );
}

/// The collaborators the checker reads from while walking a body.
pub struct SemanticContext<'ctx> {
    pub context: &'ctx Context,
    pub symtab: &'ctx SymbolTable,
}

impl<'ctx> SemanticContext<'ctx> {
    pub fn new(context: &'ctx Context, symtab: &'ctx SymbolTable) -> SemanticContext<'ctx> {
        SemanticContext { context, symtab }
    }

    pub fn report_error(&self, pos: Position, error: SemanticError) {
        self.context.diagnostics.error(&Spanned::new(pos, error))
    }

    pub fn report_error_without_position(&self, error: SemanticError) {
        self.context.diagnostics.error(&error)
    }

    pub fn type_name(&self, ty: SymIndex) -> String {
        self.symtab.type_name(ty)
    }
}
