//! The symbol table consumed by the semantic passes. Symbols are never
//! removed; an index handed out once stays valid for the whole compilation.
//!
//! The first three entries are the builtin named types `void`, `integer` and
//! `real`. Type references everywhere else in the compiler are plain indices
//! into this table, so `ty == INTEGER_TYPE` is how "is integer" is spelled.
#[macro_use]
extern crate derive_more;

mod scoped;

pub use self::scoped::{CannotLeaveRootScopeError, RedefinitionError, Scoped};
use failure::Fail;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Serialize,
    Deserialize,
)]
#[display(fmt = "#{}", _0)]
pub struct SymIndex(pub usize);

pub const VOID_TYPE: SymIndex = SymIndex(0);
pub const INTEGER_TYPE: SymIndex = SymIndex(1);
pub const REAL_TYPE: SymIndex = SymIndex(2);

const BUILTIN_TYPES: [&str; 3] = ["void", "integer", "real"];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolTag {
    Const,
    Var,
    Param,
    Array,
    Proc,
    Func,
    NameType,
}

impl SymbolTag {
    pub fn is_routine(self) -> bool {
        match self {
            SymbolTag::Proc | SymbolTag::Func => true,
            _ => false,
        }
    }
}

impl fmt::Display for SymbolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolTag::Const => "constant",
            SymbolTag::Var => "variable",
            SymbolTag::Param => "parameter",
            SymbolTag::Array => "array",
            SymbolTag::Proc => "procedure",
            SymbolTag::Func => "function",
            SymbolTag::NameType => "type",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Integer(i64),
    Real(f64),
}

impl ConstValue {
    pub fn ty(self) -> SymIndex {
        match self {
            ConstValue::Integer(_) => INTEGER_TYPE,
            ConstValue::Real(_) => REAL_TYPE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub tag: SymbolTag,
    /// Type of a value, element type of an array, return type of a
    /// function. `void` for procedures and named types.
    pub ty: SymIndex,
    /// Formal parameters of a routine in declaration order.
    #[serde(default)]
    pub params: Vec<SymIndex>,
    #[serde(default)]
    pub const_value: Option<ConstValue>,
    #[serde(default)]
    pub cardinality: Option<u64>,
}

impl Symbol {
    fn new(name: &str, tag: SymbolTag, ty: SymIndex) -> Self {
        Symbol {
            name: name.to_string(),
            tag,
            ty,
            params: Vec::new(),
            const_value: None,
            cardinality: None,
        }
    }
}

#[derive(Debug, Fail)]
pub enum SymtabError {
    #[fail(display = "redefinition of {} '{}'", kind, name)]
    Redefinition { kind: SymbolTag, name: String },
    #[fail(display = "'{}' is a {}, not a procedure or function", name, kind)]
    NotARoutine { kind: SymbolTag, name: String },
    #[fail(display = "cannot leave the global environment")]
    CannotLeaveRootEnvironment,
    #[fail(display = "symbol {} must be the builtin type '{}'", index, name)]
    MissingBuiltin { index: SymIndex, name: &'static str },
    #[fail(display = "symbol '{}' refers to unknown symbol {}", name, index)]
    DanglingIndex { name: String, index: SymIndex },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// The symbol of the main program, i.e. the global environment.
    program: SymIndex,
    #[serde(skip)]
    environments: Vec<SymIndex>,
    #[serde(skip)]
    names: Scoped<String, SymIndex>,
}

impl SymbolTable {
    pub fn new(program_name: &str) -> Self {
        let mut table = SymbolTable {
            symbols: Vec::new(),
            program: VOID_TYPE,
            environments: Vec::new(),
            names: Scoped::new(),
        };
        for name in BUILTIN_TYPES.iter() {
            table
                .define(Symbol::new(name, SymbolTag::NameType, VOID_TYPE))
                .expect("builtin type names are distinct");
        }
        table.program = SymIndex(table.symbols.len());
        table.symbols.push(Symbol::new(program_name, SymbolTag::Proc, VOID_TYPE));
        table
    }

    /// Checks a table that was not built through the `enter_*` functions,
    /// e.g. one that was deserialized.
    pub fn validate(&self) -> Result<(), SymtabError> {
        for (i, name) in BUILTIN_TYPES.iter().enumerate() {
            match self.symbols.get(i) {
                Some(sym) if sym.tag == SymbolTag::NameType && sym.name == *name => {}
                _ => {
                    return Err(SymtabError::MissingBuiltin {
                        index: SymIndex(i),
                        name: *name,
                    })
                }
            }
        }

        let in_range = |idx: SymIndex| idx.0 < self.symbols.len();
        if !in_range(self.program) || !self.get_symbol(self.program).tag.is_routine() {
            return Err(SymtabError::DanglingIndex {
                name: "<program>".to_string(),
                index: self.program,
            });
        }
        for sym in &self.symbols {
            if let Some(&index) = sym
                .params
                .iter()
                .chain(std::iter::once(&sym.ty))
                .find(|idx| !in_range(**idx))
            {
                return Err(SymtabError::DanglingIndex {
                    name: sym.name.clone(),
                    index,
                });
            }
        }
        Ok(())
    }

    pub fn program(&self) -> SymIndex {
        self.program
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get_symbol(&self, idx: SymIndex) -> &Symbol {
        self.symbols
            .get(idx.0)
            .expect("symbol indices always point into the table")
    }

    /// The innermost visible symbol named `name`, as seen from the block
    /// that is currently being declared.
    pub fn lookup(&self, name: &str) -> Option<SymIndex> {
        self.names.visible_definition(&name.to_string()).cloned()
    }

    /// The name of a type for use in messages. Indices that do not denote a
    /// named type are printed as raw indices.
    pub fn type_name(&self, ty: SymIndex) -> String {
        match self.symbols.get(ty.0) {
            Some(sym) if sym.tag == SymbolTag::NameType => sym.name.clone(),
            _ => ty.to_string(),
        }
    }

    pub fn enter_constant(
        &mut self,
        name: &str,
        value: ConstValue,
    ) -> Result<SymIndex, SymtabError> {
        let mut sym = Symbol::new(name, SymbolTag::Const, value.ty());
        sym.const_value = Some(value);
        self.define(sym)
    }

    pub fn enter_variable(&mut self, name: &str, ty: SymIndex) -> Result<SymIndex, SymtabError> {
        self.define(Symbol::new(name, SymbolTag::Var, ty))
    }

    pub fn enter_array(
        &mut self,
        name: &str,
        element_type: SymIndex,
        cardinality: u64,
    ) -> Result<SymIndex, SymtabError> {
        let mut sym = Symbol::new(name, SymbolTag::Array, element_type);
        sym.cardinality = Some(cardinality);
        self.define(sym)
    }

    pub fn enter_nametype(&mut self, name: &str) -> Result<SymIndex, SymtabError> {
        self.define(Symbol::new(name, SymbolTag::NameType, VOID_TYPE))
    }

    pub fn enter_procedure(&mut self, name: &str) -> Result<SymIndex, SymtabError> {
        self.define(Symbol::new(name, SymbolTag::Proc, VOID_TYPE))
    }

    pub fn enter_function(
        &mut self,
        name: &str,
        return_type: SymIndex,
    ) -> Result<SymIndex, SymtabError> {
        self.define(Symbol::new(name, SymbolTag::Func, return_type))
    }

    /// Appends a formal parameter to `routine`. Parameters are only visible
    /// inside the routine's own environment, so call this after
    /// `enter_environment(routine)`.
    pub fn enter_parameter(
        &mut self,
        routine: SymIndex,
        name: &str,
        ty: SymIndex,
    ) -> Result<SymIndex, SymtabError> {
        let owner = self.get_symbol(routine);
        if !owner.tag.is_routine() {
            return Err(SymtabError::NotARoutine {
                kind: owner.tag,
                name: owner.name.clone(),
            });
        }
        let param = self.define(Symbol::new(name, SymbolTag::Param, ty))?;
        self.symbols[routine.0].params.push(param);
        Ok(param)
    }

    pub fn enter_environment(&mut self, routine: SymIndex) {
        debug_assert!(self.get_symbol(routine).tag.is_routine());
        self.environments.push(routine);
        self.names.enter_scope();
    }

    pub fn leave_environment(&mut self) -> Result<SymIndex, SymtabError> {
        let left = self
            .environments
            .pop()
            .ok_or(SymtabError::CannotLeaveRootEnvironment)?;
        self.names
            .leave_scope()
            .map_err(|CannotLeaveRootScopeError| SymtabError::CannotLeaveRootEnvironment)?;
        Ok(left)
    }

    /// The routine whose body is being processed. Outside of any explicitly
    /// entered environment this is the program itself.
    pub fn current_environment(&self) -> SymIndex {
        self.environments.last().cloned().unwrap_or(self.program)
    }

    fn define(&mut self, sym: Symbol) -> Result<SymIndex, SymtabError> {
        let idx = SymIndex(self.symbols.len());
        self.names
            .define(sym.name.clone(), idx)
            .map_err(|RedefinitionError| SymtabError::Redefinition {
                kind: sym.tag,
                name: sym.name.clone(),
            })?;
        self.symbols.push(sym);
        Ok(idx)
    }
}
