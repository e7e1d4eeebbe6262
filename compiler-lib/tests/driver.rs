use compiler_lib::{
    ast::{self, BinaryOp, Expr, Stmt, StmtList},
    driver::{print_error, CompilerError, CompilerPhase, Driver},
    optimization::Level,
    program::ProgramError,
    symtab::{SymIndex, SymbolTable, INTEGER_TYPE},
    Program,
};
use failure::Error;
use srcpos::Position;
use std::{cell::RefCell, io, rc::Rc};
use termcolor::{ColorSpec, WriteColor};
use utils::assert_matches;

const SQUARE: &str = include_str!("data/square.json");

/// A writer whose output stays inspectable after it was handed to the driver.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteColor for SharedBuffer {
    fn supports_color(&self) -> bool {
        false
    }

    fn set_color(&mut self, _spec: &ColorSpec) -> io::Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Outputs {
    err: SharedBuffer,
    out: SharedBuffer,
}

fn driver() -> (Driver, Outputs) {
    let _ = env_logger::try_init();
    let outputs = Outputs {
        err: SharedBuffer::default(),
        out: SharedBuffer::default(),
    };
    let driver = Driver::default()
        .set_writer_err(Box::new(outputs.err.clone()))
        .set_writer_out(Box::new(outputs.out.clone()));
    (driver, outputs)
}

fn at(line: u32) -> Position {
    Position::new(line, 1)
}

fn routine_text(program: &Program, i: usize) -> String {
    ast::print::to_string(&program.routines[i].body, &program.symtab)
}

/// `p` assigns a real to an integer, the global body adds two literals.
fn program_with_type_error() -> Program {
    let mut symtab = SymbolTable::new("main");
    let x = symtab.enter_variable("x", INTEGER_TYPE).unwrap();
    let p = symtab.enter_procedure("p").unwrap();
    let main = symtab.program();

    let mut program = Program::new(symtab);
    program.add_routine(
        p,
        StmtList::new(vec![Stmt::assign(
            at(3),
            Expr::id(at(3), x),
            Expr::real(at(3), 2.5),
        )]),
    );
    program.add_routine(
        main,
        StmtList::new(vec![Stmt::assign(
            at(6),
            Expr::id(at(6), x),
            Expr::binary(
                at(6),
                BinaryOp::Add,
                Expr::integer(at(6), 1),
                Expr::integer(at(6), 2),
            ),
        )]),
    );
    program
}

#[test]
fn checks_and_folds_a_json_program() {
    let mut program = Program::from_json(SQUARE).unwrap();
    let (driver, outputs) = driver();

    driver.compile(&mut program).unwrap();

    assert_eq!("return (n * n);\n", routine_text(&program, 0));
    assert_eq!(
        "x := square((2 + 3));\nr := (real(x) + 3.0);\n",
        routine_text(&program, 1)
    );
    assert_eq!(
        "Type checking finished successfully without warnings\n",
        outputs.err.contents()
    );
    assert_eq!("", outputs.out.contents());
}

#[test]
fn type_errors_fail_compilation_and_suppress_folding() {
    let mut program = program_with_type_error();
    let (driver, outputs) = driver();

    let err = driver.compile(&mut program).unwrap_err();

    assert_matches!(
        err.downcast_ref::<CompilerError>(),
        Some(CompilerError::TypeErrors { count: 1 })
    );
    assert_eq!(
        "error: lhs and rhs must be of same type in assignment. lhs: integer rhs: real\n  \
         --> 3:1\nFound an error. Compilation aborted.\n",
        outputs.err.contents()
    );
    assert_eq!("x := (1 + 2);\n", routine_text(&program, 1));
}

#[test]
fn stopping_after_semantics_keeps_the_tree_unfolded() {
    let mut program = Program::from_json(SQUARE).unwrap();
    let (driver, _outputs) = driver();

    driver
        .stop_after(CompilerPhase::Semantics)
        .compile(&mut program)
        .unwrap();

    assert_eq!(
        "x := square((2 + 3));\nr := (real(x) + (1.5 * 2.0));\n",
        routine_text(&program, 1)
    );
}

#[test]
fn optimization_level_none_keeps_the_tree_unfolded() {
    let mut program = Program::from_json(SQUARE).unwrap();
    let (driver, _outputs) = driver();

    driver
        .optimization(Level::None)
        .compile(&mut program)
        .unwrap();

    assert_eq!(
        "x := square((2 + 3));\nr := (real(x) + (1.5 * 2.0));\n",
        routine_text(&program, 1)
    );
}

#[test]
fn dumps_every_routine_before_and_after_optimization() {
    let mut program = Program::from_json(SQUARE).unwrap();
    let (driver, outputs) = driver();

    driver.dump_ast(true).compile(&mut program).unwrap();

    let expected = "\nUnoptimized AST for \"square\"\n\
                    return (n * n);\n\
                    \nOptimized AST for \"square\"\n\
                    return (n * n);\n\
                    \nUnoptimized AST for \"main\"\n\
                    x := square((2 + 3));\n\
                    r := (real(x) + (1.5 * 2.0));\n\
                    \nOptimized AST for \"main\"\n\
                    x := square((2 + 3));\n\
                    r := (real(x) + 3.0);\n";
    assert_eq!(expected, outputs.out.contents());
}

#[test]
fn rejects_a_routine_that_is_not_a_procedure_or_function() {
    let mut symtab = SymbolTable::new("main");
    let x = symtab.enter_variable("x", INTEGER_TYPE).unwrap();
    let mut program = Program::new(symtab);
    program.add_routine(x, StmtList::empty());

    let err = program.validate().unwrap_err();

    assert_matches!(
        err.downcast_ref::<ProgramError>(),
        Some(ProgramError::NotARoutine { .. })
    );
}

#[test]
fn rejects_references_to_unknown_symbols() {
    let symtab = SymbolTable::new("main");
    let main = symtab.program();
    let mut program = Program::new(symtab);
    program.add_routine(
        main,
        StmtList::new(vec![Stmt::procedure_call(at(2), SymIndex(99), vec![])]),
    );

    let err = program.validate().unwrap_err();

    assert_matches!(
        err.downcast_ref::<ProgramError>(),
        Some(ProgramError::DanglingReference { sym: SymIndex(99), .. })
    );
}

#[test]
fn rejects_json_without_builtin_types() {
    let json = r#"{
        "symtab": {
            "symbols": [{ "name": "main", "tag": "Proc", "ty": 0 }],
            "program": 0
        },
        "routines": []
    }"#;

    assert!(Program::from_json(json).is_err());
}

#[test]
fn prints_errors_with_their_causes() {
    let err: Error = Error::from(ProgramError::NotARoutine { env: SymIndex(4) })
        .context("cannot load program")
        .into();
    let mut out = Vec::new();

    print_error(&mut out, &err).unwrap();

    assert_eq!(
        "error: cannot load program\n\
         caused by: routine environment #4 is not a procedure or function\n",
        String::from_utf8(out).unwrap()
    );
}
