//! Renders routine bodies in Pascal-like syntax, for AST dumps and tests.
//! Binary operations and relations are fully parenthesized so the printed
//! text shows the tree structure; casts show up as `real(...)`.
use crate::{Elsif, Expr, ExprKind, Stmt, StmtKind, StmtList};
use failure::Error;
use std::io::Write;
use symtab::{SymIndex, SymbolTable};

struct IndentPrinter<'w> {
    writer: &'w mut dyn Write,
    indent: usize,
    indent_on_next_write: bool,
}

impl<'w> IndentPrinter<'w> {
    fn new(writer: &'w mut dyn Write) -> IndentPrinter<'w> {
        IndentPrinter {
            writer,
            indent: 0,
            indent_on_next_write: false,
        }
    }

    fn print(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), Error> {
        self.indent_if_required()?;
        self.writer.write_fmt(args)?;
        Ok(())
    }

    fn print_str(&mut self, s: &str) -> Result<(), Error> {
        self.print(format_args!("{}", s))
    }

    fn newline(&mut self) -> Result<(), Error> {
        writeln!(self.writer)?;
        self.indent_on_next_write = true;
        Ok(())
    }

    fn println(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), Error> {
        self.print(args)?;
        self.newline()
    }

    fn indent_if_required(&mut self) -> Result<(), Error> {
        if self.indent_on_next_write {
            write!(self.writer, "{}", "    ".repeat(self.indent))?;
            self.indent_on_next_write = false;
        }
        Ok(())
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn outdent(&mut self) {
        debug_assert!(self.indent > 0, "setting indent below 0");
        self.indent = self.indent.saturating_sub(1);
    }
}

pub struct PrettyPrinter<'t, 'w> {
    symtab: &'t SymbolTable,
    printer: IndentPrinter<'w>,
}

/// Prints `body`, one statement per line.
pub fn print(body: &StmtList, symtab: &SymbolTable, out: &mut dyn Write) -> Result<(), Error> {
    PrettyPrinter::new(symtab, out).print_stmt_list(body)
}

/// Renders a whole statement list.
pub fn to_string(body: &StmtList, symtab: &SymbolTable) -> String {
    let mut buf = Vec::new();
    print(body, symtab, &mut buf).expect("writing to a Vec<u8> cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

impl<'t, 'w> PrettyPrinter<'t, 'w> {
    pub fn new(symtab: &'t SymbolTable, out: &'w mut dyn Write) -> Self {
        PrettyPrinter {
            symtab,
            printer: IndentPrinter::new(out),
        }
    }

    fn name(&self, sym: SymIndex) -> &'t str {
        let symtab: &'t SymbolTable = self.symtab;
        &symtab.get_symbol(sym).name
    }

    pub fn print_stmt_list(&mut self, list: &StmtList) -> Result<(), Error> {
        for stmt in &list.stmts {
            self.print_stmt(stmt)?;
        }
        Ok(())
    }

    fn print_block(&mut self, list: &StmtList) -> Result<(), Error> {
        self.printer.indent();
        self.print_stmt_list(list)?;
        self.printer.outdent();
        Ok(())
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match &stmt.kind {
            StmtKind::Assign { lhs, rhs } => {
                self.print_expr(lhs)?;
                self.printer.print_str(" := ")?;
                self.print_expr(rhs)?;
                self.printer.println(format_args!(";"))?;
            }
            StmtKind::If {
                condition,
                body,
                elsifs,
                else_body,
            } => {
                self.printer.print_str("if ")?;
                self.print_expr(condition)?;
                self.printer.println(format_args!(" then"))?;
                self.print_block(body)?;
                for Elsif {
                    condition, body, ..
                } in elsifs
                {
                    self.printer.print_str("elsif ")?;
                    self.print_expr(condition)?;
                    self.printer.println(format_args!(" then"))?;
                    self.print_block(body)?;
                }
                if let Some(else_body) = else_body {
                    self.printer.println(format_args!("else"))?;
                    self.print_block(else_body)?;
                }
                self.printer.println(format_args!("end;"))?;
            }
            StmtKind::While { condition, body } => {
                self.printer.print_str("while ")?;
                self.print_expr(condition)?;
                self.printer.println(format_args!(" do"))?;
                self.print_block(body)?;
                self.printer.println(format_args!("end;"))?;
            }
            StmtKind::Return { value: None } => {
                self.printer.println(format_args!("return;"))?;
            }
            StmtKind::Return { value: Some(value) } => {
                self.printer.print_str("return ")?;
                self.print_expr(value)?;
                self.printer.println(format_args!(";"))?;
            }
            StmtKind::ProcedureCall { callee, args } => {
                self.print_call(callee.data, args)?;
                self.printer.println(format_args!(";"))?;
            }
        }
        Ok(())
    }

    pub fn print_expr(&mut self, expr: &Expr) -> Result<(), Error> {
        match &expr.kind {
            ExprKind::Id(sym) => {
                let name = self.name(*sym);
                self.printer.print_str(name)?;
            }
            ExprKind::Indexed { array, index } => {
                let name = self.name(array.data);
                self.printer.print(format_args!("{}[", name))?;
                self.print_expr(index)?;
                self.printer.print_str("]")?;
            }
            ExprKind::Integer(value) => self.printer.print(format_args!("{}", value))?,
            ExprKind::Real(value) => self.printer.print(format_args!("{:?}", value))?,
            ExprKind::Cast(inner) => {
                self.printer.print_str("real(")?;
                self.print_expr(inner)?;
                self.printer.print_str(")")?;
            }
            ExprKind::UnaryMinus(inner) => {
                self.printer.print_str("-")?;
                self.print_expr(inner)?;
            }
            ExprKind::Not(inner) => {
                self.printer.print_str("not ")?;
                self.print_expr(inner)?;
            }
            ExprKind::FunctionCall { callee, args } => self.print_call(callee.data, args)?,
            ExprKind::Binary { op, left, right } => {
                self.printer.print_str("(")?;
                self.print_expr(left)?;
                self.printer.print(format_args!(" {} ", op))?;
                self.print_expr(right)?;
                self.printer.print_str(")")?;
            }
            ExprKind::Relation { op, left, right } => {
                self.printer.print_str("(")?;
                self.print_expr(left)?;
                self.printer.print(format_args!(" {} ", op))?;
                self.print_expr(right)?;
                self.printer.print_str(")")?;
            }
        }
        Ok(())
    }

    fn print_call(&mut self, callee: SymIndex, args: &[Expr]) -> Result<(), Error> {
        let name = self.name(callee);
        self.printer.print(format_args!("{}(", name))?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.printer.print_str(", ")?;
            }
            self.print_expr(arg)?;
        }
        self.printer.print_str(")")
    }
}
