//! The input of the driver: a symbol table plus the body of every routine,
//! as produced by the parser. It can be (de)serialized, which is how the
//! command line tool receives it.
use ast::StmtList;
use failure::{Error, Fail};
use serde_derive::{Deserialize, Serialize};
use std::io::Read;
use symtab::{SymIndex, SymbolTable};

#[derive(Debug, Serialize, Deserialize)]
pub struct Program {
    pub symtab: SymbolTable,
    /// In source order. The global statement list is the routine whose
    /// environment is `symtab.program()`.
    pub routines: Vec<Routine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub env: SymIndex,
    #[serde(default)]
    pub body: StmtList,
}

#[derive(Debug, Fail)]
pub enum ProgramError {
    #[fail(display = "routine environment {} is not a procedure or function", env)]
    NotARoutine { env: SymIndex },
    #[fail(display = "routine environment {} does not exist", env)]
    UnknownEnvironment { env: SymIndex },
    #[fail(display = "body of routine {} refers to unknown symbol {}", env, sym)]
    DanglingReference { env: SymIndex, sym: SymIndex },
}

impl Program {
    pub fn new(symtab: SymbolTable) -> Self {
        Program {
            symtab,
            routines: Vec::new(),
        }
    }

    pub fn add_routine(&mut self, env: SymIndex, body: StmtList) {
        self.routines.push(Routine { env, body });
    }

    /// Reads a JSON encoded program and checks that its indices are sound.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let program: Program = serde_json::from_reader(reader)?;
        program.validate()?;
        Ok(program)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Self::from_reader(json.as_bytes())
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.symtab.validate()?;
        for routine in &self.routines {
            if routine.env.0 >= self.symtab.len() {
                return Err(ProgramError::UnknownEnvironment { env: routine.env }.into());
            }
            if !self.symtab.get_symbol(routine.env).tag.is_routine() {
                return Err(ProgramError::NotARoutine { env: routine.env }.into());
            }

            let mut dangling = None;
            routine.body.for_each_symbol(&mut |sym| {
                if sym.0 >= self.symtab.len() && dangling.is_none() {
                    dangling = Some(sym);
                }
            });
            if let Some(sym) = dangling {
                return Err(ProgramError::DanglingReference {
                    env: routine.env,
                    sym,
                }
                .into());
            }
        }
        Ok(())
    }
}
