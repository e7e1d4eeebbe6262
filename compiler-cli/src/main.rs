#![warn(rust_2018_idioms)]
#![warn(clippy::print_stdout)]

mod optimization_arg;

use compiler_lib::{
    driver::{exit_process_with_error, CompilerError, CompilerPhase, Driver},
    Program,
};
use failure::{Error, Fail, ResultExt};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::exit,
};
use structopt::StructOpt;

#[derive(Debug, Fail)]
pub enum CliError {
    #[fail(display = "cannot open input file {:?}", path)]
    OpenInput { path: PathBuf },
    #[fail(display = "cannot decode program in {:?}", path)]
    Decode { path: PathBuf },
}

#[derive(StructOpt)]
#[structopt(name = "pascal-check")]
pub struct CliCommand {
    /// JSON file holding the symbol table and the routine bodies
    #[structopt(name = "FILE", parse(from_os_str))]
    input: PathBuf,
    /// print every routine body before and after optimization
    #[structopt(long = "dump-ast")]
    dump_ast: bool,
    /// `none`, `moderate` or `custom:ConstantFolding,...`
    #[structopt(short = "O", long = "optimization", default_value = "moderate")]
    optimization: optimization_arg::Arg,
    /// `semantics` or `optimization`
    #[structopt(long = "stop-after", default_value = "optimization")]
    stop_after: CompilerPhase,
}

fn main() {
    env_logger::init();
    let cmd = CliCommand::from_args();

    if let Err(err) = run(cmd) {
        // the diagnostics were already written, don't repeat them
        if err.downcast_ref::<CompilerError>().is_some() {
            exit(1);
        }
        exit_process_with_error(&err);
    }
}

fn run(cmd: CliCommand) -> Result<(), Error> {
    let mut program = read_program(&cmd.input)?;
    log::debug!(
        "read {} routine(s) from {:?}",
        program.routines.len(),
        cmd.input
    );

    Driver::default()
        .dump_ast(cmd.dump_ast)
        .optimization(cmd.optimization.into())
        .stop_after(cmd.stop_after)
        .compile(&mut program)
}

fn read_program(path: &Path) -> Result<Program, Error> {
    let file = File::open(path).context(CliError::OpenInput { path: path.to_path_buf() })?;
    let program = Program::from_reader(BufReader::new(file))
        .map_err(|err| err.context(CliError::Decode { path: path.to_path_buf() }))?;
    Ok(program)
}
