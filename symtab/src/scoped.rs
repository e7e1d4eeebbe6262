use std::{collections::HashMap, hash::Hash};

#[derive(Clone, Copy, Debug)]
enum ScopeIdx {
    Root,
    Dynamic(usize),
}

/// Name visibility for nested declaration blocks. The generic type `S` is the
/// name and `T` is the value stored for it (a symbol index, in practice).
#[derive(Debug)]
pub struct Scoped<S, T>
where
    S: Hash + Eq + Clone,
{
    root: HashMap<S, T>,
    scopes: Vec<HashMap<S, T>>,
    visible_defs: HashMap<S, Vec<ScopeIdx>>,
}

#[derive(Debug)]
pub struct CannotLeaveRootScopeError;
#[derive(Debug)]
pub struct RedefinitionError;

impl<S, T> Default for Scoped<S, T>
where
    S: Hash + Eq + Clone,
{
    fn default() -> Self {
        Scoped {
            root: HashMap::new(),
            scopes: Vec::new(),
            visible_defs: HashMap::new(),
        }
    }
}

impl<S, T> Scoped<S, T>
where
    S: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new())
    }

    pub fn leave_scope(&mut self) -> Result<(), CannotLeaveRootScopeError> {
        let popped = self.scopes.pop().ok_or(CannotLeaveRootScopeError)?;
        for (sym, _) in popped {
            let shadowed = self
                .visible_defs
                .get_mut(&sym)
                .expect("scopes inconsistent with visible_defs");
            shadowed.pop();
            if shadowed.is_empty() {
                self.visible_defs.remove(&sym);
            }
        }
        Ok(())
    }

    /// Defines `sym` in the innermost scope. Shadowing a definition of an
    /// outer scope is allowed, redefining one of the same scope is not.
    pub fn define(&mut self, sym: S, val: T) -> Result<(), RedefinitionError> {
        let (current_scope, scope_idx) = self.current_scope();
        if current_scope.contains_key(&sym) {
            return Err(RedefinitionError);
        }
        current_scope.insert(sym.clone(), val);
        self.visible_defs
            .entry(sym)
            .or_insert_with(Vec::new)
            .push(scope_idx);
        Ok(())
    }

    pub fn visible_definition(&self, sym: &S) -> Option<&T> {
        let scope = match self.visible_defs.get(sym).and_then(|idxs| idxs.last()) {
            Some(&idx) => self.get_scope(idx),
            None => return None,
        };
        let res = scope
            .get(sym)
            .expect("visible_defs is inconsistent with state of symbol tables");
        Some(res)
    }

    fn current_scope(&mut self) -> (&mut HashMap<S, T>, ScopeIdx) {
        if !self.scopes.is_empty() {
            let idx = self.scopes.len() - 1;
            (&mut self.scopes[idx], ScopeIdx::Dynamic(idx))
        } else {
            (&mut self.root, ScopeIdx::Root)
        }
    }

    fn get_scope(&self, scope_idx: ScopeIdx) -> &HashMap<S, T> {
        match scope_idx {
            ScopeIdx::Root => &self.root,
            ScopeIdx::Dynamic(idx) => &self.scopes[idx],
        }
    }
}
