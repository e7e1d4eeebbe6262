use ast::{print, BinaryOp, Elsif, Expr, RelOp, Stmt, StmtList};
use compiler_shared::context::Context;
use optimization::{optimize, Level, Outcome};
use srcpos::Position;
use symtab::{ConstValue, SymIndex, SymbolTable, INTEGER_TYPE, REAL_TYPE};
use type_checking::typecheck;

fn at() -> Position {
    Position::new(1, 1)
}

fn int(value: i64) -> Expr {
    Expr::integer(at(), value)
}

fn id(sym: SymIndex) -> Expr {
    Expr::id(at(), sym)
}

fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(at(), op, left, right)
}

struct Program {
    symtab: SymbolTable,
    x: SymIndex,
    y: SymIndex,
    r: SymIndex,
    a: SymIndex,
    n: SymIndex,
    p: SymIndex,
}

impl Program {
    fn new() -> Self {
        let _ = env_logger::try_init();
        let mut symtab = SymbolTable::new("main");
        let x = symtab.enter_variable("x", INTEGER_TYPE).unwrap();
        let y = symtab.enter_variable("y", INTEGER_TYPE).unwrap();
        let r = symtab.enter_variable("r", REAL_TYPE).unwrap();
        let a = symtab.enter_array("a", INTEGER_TYPE, 8).unwrap();
        let n = symtab.enter_constant("N", ConstValue::Integer(10)).unwrap();
        let p = symtab.enter_procedure("p").unwrap();
        symtab.enter_environment(p);
        symtab.enter_parameter(p, "v", INTEGER_TYPE).unwrap();
        symtab.leave_environment().unwrap();
        Program {
            symtab,
            x,
            y,
            r,
            a,
            n,
            p,
        }
    }

    /// Checks and folds `stmts` as the global body, returns the printed result.
    fn fold(&self, stmts: Vec<Stmt>) -> String {
        let mut body = StmtList::new(stmts);
        let context = Context::dummy();
        typecheck(&context, &self.symtab, self.symtab.program(), &mut body);
        assert!(!context.diagnostics.errored(), "{:?}", context.diagnostics.messages());
        optimize(&mut body);
        print::to_string(&body, &self.symtab)
    }
}

#[test]
fn assignments_are_folded() {
    let prog = Program::new();
    let out = prog.fold(vec![Stmt::assign(
        at(),
        id(prog.x),
        bin(BinaryOp::Mult, bin(BinaryOp::Add, int(2), int(3)), int(4)),
    )]);
    assert_eq!("x := 20;\n", out);
}

#[test]
fn no_partial_folding_across_non_literals() {
    let prog = Program::new();
    let out = prog.fold(vec![
        Stmt::assign(at(), id(prog.x), bin(BinaryOp::Add, int(2), id(prog.y))),
        Stmt::assign(
            at(),
            id(prog.x),
            bin(BinaryOp::Add, bin(BinaryOp::Add, int(2), int(3)), id(prog.y)),
        ),
    ]);
    assert_eq!("x := (2 + y);\nx := (5 + y);\n", out);
}

#[test]
fn named_constants_are_not_substituted() {
    let prog = Program::new();
    let out = prog.fold(vec![Stmt::assign(
        at(),
        id(prog.x),
        bin(BinaryOp::Add, id(prog.n), int(1)),
    )]);
    assert_eq!("x := (N + 1);\n", out);
}

#[test]
fn casts_block_folding() {
    let prog = Program::new();
    let out = prog.fold(vec![Stmt::assign(
        at(),
        id(prog.r),
        bin(BinaryOp::Add, int(1), Expr::real(at(), 2.5)),
    )]);
    assert_eq!("r := (real(1) + 2.5);\n", out);
}

#[test]
fn relations_fold_operands_but_stay_relations() {
    let prog = Program::new();
    let out = prog.fold(vec![Stmt::while_stmt(
        at(),
        Expr::relation(
            at(),
            RelOp::LessThan,
            bin(BinaryOp::Add, int(1), int(2)),
            bin(BinaryOp::Mult, int(3), int(4)),
        ),
        StmtList::new(vec![Stmt::assign(at(), id(prog.x), bin(BinaryOp::Sub, int(9), int(1)))]),
    )]);
    assert_eq!("while (3 < 12) do\n    x := 8;\nend;\n", out);
}

#[test]
fn call_arguments_are_never_folded() {
    let prog = Program::new();
    let out = prog.fold(vec![Stmt::procedure_call(
        at(),
        prog.p,
        vec![bin(BinaryOp::Add, int(1), int(2))],
    )]);
    assert_eq!("p((1 + 2));\n", out);
}

#[test]
fn unary_operands_and_indices_are_folded() {
    let prog = Program::new();
    let out = prog.fold(vec![
        Stmt::assign(at(), id(prog.x), Expr::uminus(at(), bin(BinaryOp::Mult, int(2), int(3)))),
        Stmt::assign(
            at(),
            id(prog.x),
            Expr::indexed(at(), prog.a, bin(BinaryOp::Add, int(1), int(1))),
        ),
        // the assignment target is left alone
        Stmt::assign(
            at(),
            Expr::indexed(at(), prog.a, bin(BinaryOp::Add, int(1), int(1))),
            int(0),
        ),
    ]);
    assert_eq!("x := -6;\nx := a[2];\na[(1 + 1)] := 0;\n", out);
}

#[test]
fn conditions_of_all_branches_are_folded() {
    let prog = Program::new();
    let out = prog.fold(vec![Stmt::if_stmt(
        at(),
        bin(BinaryOp::And, int(1), int(0)),
        StmtList::empty(),
        vec![Elsif::new(
            at(),
            bin(BinaryOp::Or, int(0), int(1)),
            StmtList::new(vec![Stmt::assign(at(), id(prog.y), bin(BinaryOp::Mod, int(7), int(4)))]),
        )],
        Some(StmtList::new(vec![Stmt::assign(
            at(),
            id(prog.y),
            bin(BinaryOp::Idiv, int(9), int(2)),
        )])),
    )]);
    assert_eq!(
        "if 0 then\nelsif 1 then\n    y := 3;\nelse\n    y := 4;\nend;\n",
        out
    );
}

#[test]
fn optimizing_twice_changes_nothing_more() {
    let prog = Program::new();
    let mut body = StmtList::new(vec![
        Stmt::assign(
            at(),
            id(prog.x),
            bin(BinaryOp::Sub, bin(BinaryOp::Mult, int(6), int(7)), id(prog.y)),
        ),
        Stmt::return_stmt(at(), None),
    ]);
    let context = Context::dummy();
    typecheck(&context, &prog.symtab, prog.symtab.program(), &mut body);

    assert_eq!(Outcome::Changed, optimize(&mut body));
    let once = body.clone();
    assert_eq!(Outcome::Unchanged, optimize(&mut body));
    assert_eq!(once, body);
    assert_eq!("x := (42 - y);\nreturn;\n", print::to_string(&body, &prog.symtab));
}

#[test]
fn level_none_leaves_the_tree_alone() {
    let prog = Program::new();
    let mut body = StmtList::new(vec![Stmt::assign(
        at(),
        id(prog.x),
        bin(BinaryOp::Add, int(2), int(3)),
    )]);
    let context = Context::dummy();
    typecheck(&context, &prog.symtab, prog.symtab.program(), &mut body);
    let checked = body.clone();

    assert_eq!(Outcome::Unchanged, Level::None.run_all(&mut body));
    assert_eq!(checked, body);
    assert_eq!(Outcome::Changed, Level::Moderate.run_all(&mut body));
    assert_eq!("x := 5;\n", print::to_string(&body, &prog.symtab));
}
