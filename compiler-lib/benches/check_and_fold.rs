use criterion::{criterion_group, criterion_main, Criterion};

use compiler_lib::{
    ast::{BinaryOp, Expr, Stmt, StmtList},
    context::Context,
    optimization::Level,
    symtab::{SymIndex, SymbolTable, INTEGER_TYPE, REAL_TYPE},
    type_checking::typecheck,
};
use srcpos::Position;

/// `r := (x + 1) * 2.5 - (3 div 2)` repeated `len` times
fn arithmetic_body(x: SymIndex, r: SymIndex, len: usize) -> StmtList {
    let pos = Position::default();
    let stmts = (0..len)
        .map(|_| {
            let sum = Expr::binary(pos, BinaryOp::Add, Expr::id(pos, x), Expr::integer(pos, 1));
            let product = Expr::binary(pos, BinaryOp::Mult, sum, Expr::real(pos, 2.5));
            let quotient = Expr::binary(
                pos,
                BinaryOp::Idiv,
                Expr::integer(pos, 3),
                Expr::integer(pos, 2),
            );
            Stmt::assign(
                pos,
                Expr::id(pos, r),
                Expr::binary(pos, BinaryOp::Sub, product, quotient),
            )
        })
        .collect();
    StmtList::new(stmts)
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "check_and_fold",
        |bencher, input| {
            let mut symtab = SymbolTable::new("main");
            let x = symtab.enter_variable("x", INTEGER_TYPE).unwrap();
            let r = symtab.enter_variable("r", REAL_TYPE).unwrap();
            let program = symtab.program();
            let context = Context::dummy();
            let level = Level::default();

            bencher.iter_with_setup(
                || arithmetic_body(x, r, *input),
                |mut body| {
                    typecheck(&context, &symtab, program, &mut body);
                    level.run_all(&mut body);
                    body
                },
            );
        },
        vec![1, 10, 100, 1000],
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
