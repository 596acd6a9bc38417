//! Parse-time binding validation: duplicate lexical declarations, duplicate
//! parameter names, and `eval`/`arguments` restrictions in strict mode.
//!
//! Three chained maps track declared names the way the grammar's early-error
//! rules are phrased: a `var`-scoped map rooted at the nearest function (or
//! the program), a `let`/`const`-scoped map rooted at the nearest block, and
//! a parent link so a block scope can check whether a `let`/`const` name
//! collides with an enclosing `var`.

use ahash::AHashMap;
use smartstring::alias::String as Atom;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum BindingKind {
    Var,
    Lexical,
    Param,
    FunctionName,
    CatchParam,
}

/// One level of block/function scope during parsing.
pub(crate) struct ScopeLevel {
    /// Names declared `var` anywhere within this function (hoisted to the
    /// function's top, not the innermost block).
    var_names: AHashMap<Atom, ()>,
    /// Names declared `let`/`const`/class/function in this exact block.
    lexical_names: AHashMap<Atom, ()>,
    /// True for the scope introduced by a function body (where `var_names`
    /// lives); false for a plain block, which forwards `var` declarations to
    /// its nearest function-scope ancestor.
    is_function_top: bool,
}

impl ScopeLevel {
    fn new(is_function_top: bool) -> Self {
        Self {
            var_names: AHashMap::new(),
            lexical_names: AHashMap::new(),
            is_function_top,
        }
    }
}

/// A stack of [`ScopeLevel`]s, innermost last. Lives on the parser and is
/// pushed/popped around every block, function body, and `for` head.
pub(crate) struct ScopeStack {
    levels: Vec<ScopeLevel>,
}

impl ScopeStack {
    pub(crate) fn new() -> Self {
        Self { levels: vec![ScopeLevel::new(true)] }
    }

    pub(crate) fn push_block(&mut self) {
        self.levels.push(ScopeLevel::new(false));
    }

    pub(crate) fn push_function(&mut self) {
        self.levels.push(ScopeLevel::new(true));
    }

    pub(crate) fn pop(&mut self) {
        self.levels.pop();
    }

    fn nearest_function_index(&self) -> usize {
        self.levels
            .iter()
            .rposition(|l| l.is_function_top)
            .unwrap_or(0)
    }

    /// Record a `var` declaration, hoisting it to the nearest function scope.
    /// Returns `false` if this name collides with a `let`/`const` binding
    /// visible from here down to (and including) that function scope.
    pub(crate) fn declare_var(&mut self, name: &Atom) -> bool {
        let fn_idx = self.nearest_function_index();
        for level in &self.levels[fn_idx..] {
            if level.lexical_names.contains_key(name) {
                return false;
            }
        }
        self.levels[fn_idx].var_names.insert(name.clone(), ());
        true
    }

    /// Record a `let`/`const`/class/function-declaration binding in the
    /// current (innermost) block. Returns `false` on a duplicate, whether
    /// against another lexical binding in the same block or a `var` hoisted
    /// into it.
    pub(crate) fn declare_lexical(&mut self, name: &Atom) -> bool {
        let top = self.levels.last_mut().expect("scope stack never empty");
        if top.lexical_names.contains_key(name) || top.var_names.contains_key(name) {
            return false;
        }
        top.lexical_names.insert(name.clone(), ());
        true
    }

    /// Record a single parameter name; returns `false` on a duplicate within
    /// the same parameter list, which callers reject only when required
    /// (non-simple parameter lists, strict mode, or arrow functions always
    /// forbid it; simple sloppy-mode function parameter lists do not).
    pub(crate) fn declare_param(&mut self, seen: &mut AHashMap<Atom, ()>, name: &Atom) -> bool {
        seen.insert(name.clone(), ()).is_none()
    }
}

/// Tracks active labels for `break`/`continue` validation, separate from
/// [`ScopeStack`] because labels nest along the *statement*, not block,
/// structure and are visible to nested function bodies not at all.
pub(crate) struct LabelStack {
    labels: Vec<(Atom, bool)>,
}

impl LabelStack {
    pub(crate) fn new() -> Self {
        Self { labels: Vec::new() }
    }

    pub(crate) fn push(&mut self, name: Atom, is_loop: bool) -> bool {
        if self.labels.iter().any(|(n, _)| n == &name) {
            return false;
        }
        self.labels.push((name, is_loop));
        true
    }

    pub(crate) fn pop(&mut self) {
        self.labels.pop();
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.labels.iter().any(|(n, _)| n == name)
    }

    pub(crate) fn contains_loop(&self, name: &str) -> bool {
        self.labels.iter().any(|(n, is_loop)| n == name && *is_loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_hoists_through_blocks() {
        let mut scope = ScopeStack::new();
        scope.push_block();
        assert!(scope.declare_var(&Atom::from("x")));
        scope.pop();
        // The var is visible at the function level, so a second declaration
        // inside another nested block is still allowed (`var` permits redeclaration).
        scope.push_block();
        assert!(scope.declare_var(&Atom::from("x")));
        scope.pop();
    }

    #[test]
    fn lexical_duplicate_in_same_block_rejected() {
        let mut scope = ScopeStack::new();
        assert!(scope.declare_lexical(&Atom::from("x")));
        assert!(!scope.declare_lexical(&Atom::from("x")));
    }

    #[test]
    fn var_conflicts_with_lexical_in_same_function() {
        let mut scope = ScopeStack::new();
        assert!(scope.declare_lexical(&Atom::from("x")));
        assert!(!scope.declare_var(&Atom::from("x")));
    }

    #[test]
    fn labels_cannot_repeat_while_active() {
        let mut labels = LabelStack::new();
        assert!(labels.push(Atom::from("outer"), true));
        assert!(!labels.push(Atom::from("outer"), true));
        labels.pop();
        assert!(labels.push(Atom::from("outer"), true));
    }
}
