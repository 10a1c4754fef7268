use crate::value::Value;
use std::collections::HashMap;
use tracing::trace;

// A write made from an inner scope to a binding owned further out, with the
// value it replaced.
#[derive(Debug, Clone, PartialEq)]
enum Undo {
    Binding { name: String, old: Value },
    Element { name: String, index: usize, old: Value },
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Scope {
    bindings: HashMap<String, Value>,
    undo: Vec<Undo>,
}

/// Binding store mapping identifiers to values.
///
/// Blocks push a scope with [`push_scope`](Self::push_scope). Lookups walk
/// outward and writes land in the scope that owns the name, so names are
/// unique across the whole chain. Leaving a block normally
/// ([`commit_scope`](Self::commit_scope)) drops its declarations and keeps
/// its writes. Leaving early ([`rollback_scope`](Self::rollback_scope)) also
/// restores every outer binding the block wrote to. A function call starts
/// from a fresh environment seeded through
/// [`import_functions`](Self::import_functions).
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    fn owner(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rposition(|scope| scope.bindings.contains_key(name))
    }

    fn innermost(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.owner(name).is_some()
    }

    /// Binds `name` in the innermost scope.
    pub fn declare(&mut self, name: impl Into<String>, value: Value) {
        self.innermost().bindings.insert(name.into(), value);
    }

    /// Overwrites an existing binding where it lives. Returns false when
    /// `name` is unbound.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        let Some(owner) = self.owner(name) else {
            return false;
        };
        let old = self.scopes[owner].bindings.insert(name.to_string(), value);
        if let Some(old) = old {
            self.record(owner, Undo::Binding { name: name.to_string(), old });
        }
        true
    }

    /// Replaces one element of the array bound to `name`. Returns false
    /// when there is no such array element.
    pub fn assign_element(&mut self, name: &str, index: usize, value: Value) -> bool {
        let Some(owner) = self.owner(name) else {
            return false;
        };
        let old = match self.scopes[owner].bindings.get_mut(name) {
            Some(Value::Array(array)) => match array.elements.get_mut(index) {
                Some(element) => std::mem::replace(element, value),
                None => return false,
            },
            _ => return false,
        };
        self.record(owner, Undo::Element { name: name.to_string(), index, old });
        true
    }

    // Writes to a scope's own bindings vanish with it and need no undo.
    fn record(&mut self, owner: usize, undo: Undo) {
        if owner + 1 < self.scopes.len() {
            self.innermost().undo.push(undo);
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        trace!(depth = self.scopes.len(), "entered scope");
    }

    /// Drops the innermost scope's declarations and keeps its writes.
    pub fn commit_scope(&mut self) {
        if self.scopes.len() < 2 {
            return;
        }
        if let Some(scope) = self.scopes.pop() {
            trace!(dropped = scope.bindings.len(), "left scope");
            // The parent may still be left early, which undoes these too.
            if self.scopes.len() > 1 {
                self.innermost().undo.extend(scope.undo);
            }
        }
    }

    /// Drops the innermost scope and restores what it overwrote.
    pub fn rollback_scope(&mut self) {
        if self.scopes.len() < 2 {
            return;
        }
        if let Some(scope) = self.scopes.pop() {
            trace!(restored = scope.undo.len(), "rolled back scope");
            for undo in scope.undo.into_iter().rev() {
                self.restore(undo);
            }
        }
    }

    fn restore(&mut self, undo: Undo) {
        match undo {
            Undo::Binding { name, old } => {
                if let Some(owner) = self.owner(&name) {
                    self.scopes[owner].bindings.insert(name, old);
                }
            }
            Undo::Element { name, index, old } => {
                if let Some(owner) = self.owner(&name) {
                    if let Some(Value::Array(array)) = self.scopes[owner].bindings.get_mut(&name) {
                        if let Some(element) = array.elements.get_mut(index) {
                            *element = old;
                        }
                    }
                }
            }
        }
    }

    /// Copies every visible function binding of `other` into this
    /// environment's innermost scope, replacing same-named bindings.
    pub fn import_functions(&mut self, other: &Environment) {
        for scope in &other.scopes {
            for (name, value) in &scope.bindings {
                if let Value::Function(_) = value {
                    self.declare(name.clone(), value.clone());
                }
            }
        }
    }

    /// Number of visible bindings.
    pub fn len(&self) -> usize {
        self.scopes.iter().map(|scope| scope.bindings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
