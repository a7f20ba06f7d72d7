use indexmap::IndexMap;

use crate::value::{Number, UserFunction};

/// Parameter bindings of the user function currently being evaluated.
pub type Scope = IndexMap<String, Number>;

/// Interpreter-lifetime symbol tables: global variables and user functions.
/// Insertion order is kept so listings read in definition order.
#[derive(Debug, Default)]
pub struct Environment {
    variables: IndexMap<String, Number>,
    functions: IndexMap<String, UserFunction>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_variable(&mut self, name: String, value: Number) {
        self.variables.insert(name, value);
    }

    pub fn variable(&self, name: &str) -> Option<Number> {
        self.variables.get(name).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, Number)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Returns the replaced definition, if any.
    pub fn define_function(&mut self, function: UserFunction) -> Option<UserFunction> {
        self.functions.insert(function.name.clone(), function)
    }

    pub fn function(&self, name: &str) -> Option<&UserFunction> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &UserFunction> {
        self.functions.values()
    }
}
