//! Optimizations on checked routine bodies.
//!
//! The only pass is constant folding. It runs after type checking and relies
//! on the types stored in the tree to decide which literal to produce.
#[macro_use]
extern crate derive_more;

pub mod constant_folding;

pub use self::constant_folding::{fold_constants, fold_function, optimize, ConstantFolding};
use ast::StmtList;

/// An optimization that works on a single routine body and therefore does
/// not optimize across call boundaries.
pub trait Local {
    fn optimize_body(body: &mut StmtList) -> Outcome;
}

/// All available optimizations
#[derive(
    strum_macros::EnumString,
    serde_derive::Deserialize,
    serde_derive::Serialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Display,
)]
pub enum Kind {
    ConstantFolding,
}

impl Kind {
    fn run(self, body: &mut StmtList) -> Outcome {
        match self {
            Kind::ConstantFolding => ConstantFolding::optimize_body(body),
        }
    }
}

/// Predefined sequences of optimizations (in clang and gcc these are
/// called `-O0`, `-O1` and so forth).
#[derive(Debug, Clone, PartialEq)]
pub enum Level {
    /// Leaves the checked tree as it is.
    None,
    /// Folds constant subexpressions.
    Moderate,
    /// A user-defined sequence of optimizations
    Custom(Vec<Kind>),
}

impl Default for Level {
    fn default() -> Level {
        Level::Moderate
    }
}

impl Level {
    pub fn sequence(&self) -> Vec<Kind> {
        match self {
            Level::None => vec![],
            Level::Moderate => vec![Kind::ConstantFolding],
            Level::Custom(list) => list.clone(),
        }
    }

    /// run the list of optimizations defined by the optimization level
    /// on the given routine body
    pub fn run_all(&self, body: &mut StmtList) -> Outcome {
        let mut collector = OutcomeCollector::new();

        for (i, kind) in self.sequence().into_iter().enumerate() {
            log::info!("Running optimization #{}: {:?}", i, kind);
            let outcome = kind.run(body);
            log::debug!("Finished optimization #{}: {} ({:?})", i, kind, outcome);
            collector.push(outcome);
        }

        collector.result()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Outcome {
    Unchanged,
    Changed,
}

#[derive(Default)]
pub struct OutcomeCollector {
    results: Vec<Outcome>,
}

impl OutcomeCollector {
    pub fn new() -> OutcomeCollector {
        Self::default()
    }

    pub fn push(&mut self, res: Outcome) {
        self.results.push(res);
    }

    pub fn result(&self) -> Outcome {
        if self.results.iter().any(|x| *x == Outcome::Changed) {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }
}
