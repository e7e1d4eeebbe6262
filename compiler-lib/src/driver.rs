use crate::program::Program;
use ast::print;
use compiler_shared::context::Context;
use diagnostics::MessageLevel;
use failure::{Error, Fail};
use optimization::Level;
use std::{io, process::exit};
use termcolor::{ColorChoice, StandardStream, WriteColor};
use type_checking::typecheck;

#[derive(Debug, Clone, Copy, PartialEq, strum_macros::EnumString)]
pub enum CompilerPhase {
    #[strum(serialize = "semantics")]
    Semantics,
    #[strum(serialize = "optimization")]
    Optimization,
}

#[derive(Debug, Fail)]
pub enum CompilerError {
    #[fail(display = "compilation aborted due to {} type error(s)", count)]
    TypeErrors { count: usize },
}

pub struct Driver {
    /// error output. Defaults to stderr.
    writer_err: Box<dyn WriteColor>,
    /// output of AST dumps. Defaults to stdout.
    writer_out: Box<dyn WriteColor>,
    /// Stops compilation after the given phase.
    stop_after: CompilerPhase,
    optimization: Level,
    /// print every routine body before and after optimization
    dump_ast: bool,
}

impl Default for Driver {
    fn default() -> Self {
        Self {
            writer_err: Box::new(StandardStream::stderr(ColorChoice::Auto)),
            writer_out: Box::new(StandardStream::stdout(ColorChoice::Auto)),
            stop_after: CompilerPhase::Optimization,
            optimization: Level::default(),
            dump_ast: false,
        }
    }
}

impl Driver {
    pub fn set_writer_err(mut self, writer: Box<dyn WriteColor>) -> Self {
        self.writer_err = writer;
        self
    }

    pub fn set_writer_out(mut self, writer: Box<dyn WriteColor>) -> Self {
        self.writer_out = writer;
        self
    }

    pub fn stop_after(mut self, phase: CompilerPhase) -> Self {
        self.stop_after = phase;
        self
    }

    pub fn optimization(mut self, level: Level) -> Self {
        self.optimization = level;
        self
    }

    pub fn dump_ast(mut self, yes: bool) -> Self {
        self.dump_ast = yes;
        self
    }

    /// Type checks every routine of `program` and, as long as no type error
    /// was reported, folds its constants. The routines are rewritten in
    /// place. Fails with `CompilerError::TypeErrors` if anything was reported.
    pub fn compile(self, program: &mut Program) -> Result<(), Error> {
        let Driver {
            writer_err,
            mut writer_out,
            stop_after,
            optimization,
            dump_ast,
        } = self;
        let context = Context::new(writer_err);
        let Program { symtab, routines } = program;

        for routine in routines.iter_mut() {
            let name = symtab.get_symbol(routine.env).name.clone();
            symtab.enter_environment(routine.env);

            typecheck(&context, symtab, routine.env, &mut routine.body);
            if dump_ast {
                writeln!(writer_out, "\nUnoptimized AST for \"{}\"", name)?;
                print::print(&routine.body, symtab, &mut writer_out)?;
            }

            if stop_after == CompilerPhase::Optimization && !context.diagnostics.errored() {
                let outcome = optimization.run_all(&mut routine.body);
                log::debug!("optimizing '{}': {:?}", name, outcome);
                if dump_ast {
                    writeln!(writer_out, "\nOptimized AST for \"{}\"", name)?;
                    print::print(&routine.body, symtab, &mut writer_out)?;
                }
            }

            symtab.leave_environment()?;
        }

        context.diagnostics.write_statistics();

        if context.diagnostics.errored() {
            return Err(CompilerError::TypeErrors {
                count: context.diagnostics.count(MessageLevel::Error),
            }
            .into());
        }
        Ok(())
    }
}

/// Print an error in a format intended for end users and terminate
/// the program.
pub fn exit_process_with_error(err: &Error) -> ! {
    let mut stderr = io::stderr();
    print_error(&mut stderr, err).expect("unable to print error");
    exit(1);
}

/// Print error objects in a format intended for end users
pub fn print_error(writer: &mut dyn io::Write, err: &Error) -> Result<(), Error> {
    writeln!(writer, "error: {}", err.as_fail())?;
    for cause in err.iter_causes() {
        writeln!(writer, "caused by: {}", cause)?;
    }
    Ok(())
}
