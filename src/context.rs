//! The parsing context: a value-typed bitset threaded through every
//! recursive-descent call, collapsed into a single machine word so deriving
//! a child context for a callee is a cheap, `Copy`, allocation-free
//! operation. A `Context` is never mutated in place; a callee receives a
//! value derived from the caller's by `.with(...)` / `.without(...)`.

use std::ops::{BitOr, BitOrAssign};

macro_rules! context_bits {
    ($($(#[$meta:meta])* $name:ident = $bit:expr;)*) => {
        $(
            $(#[$meta])*
            pub const $name: Context = Context(1 << $bit);
        )*
    };
}

/// Bitset of the grammar-gating booleans the parser threads by value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Context(u32);

impl Context {
    context_bits! {
        /// Strict-mode code (set for the whole of a scope once enabled; never cleared).
        STRICT = 0;
        /// Parsing a module (implies `STRICT` and `ALLOW_AWAIT`).
        MODULE = 1;
        /// `in` is a valid binary operator at this position (cleared inside `for(;;)` headers).
        ALLOW_IN = 2;
        /// `yield` is a keyword, not an identifier.
        ALLOW_YIELD = 3;
        /// `await` is a keyword, not an identifier.
        ALLOW_AWAIT = 4;
        /// Inside the body of an async function.
        IN_ASYNC_FUNCTION_BODY = 5;
        /// Inside a `for` statement's head.
        IN_FOR_STATEMENT = 6;
        /// Parsing a binding pattern (destructuring target), not an expression.
        IN_BINDING = 7;
        /// The enclosing declaration is `let`.
        LET = 8;
        /// The enclosing declaration is `const`.
        CONST = 9;
        /// The enclosing declaration is lexical (`let` or `const`).
        LEXICAL = 10;
        /// A binding pattern requires an initializer (lexical declarations, not `for-in`/`for-of`).
        REQUIRE_INITIALIZER = 11;
        /// Parsing an `export` declaration.
        EXPORT = 12;
        /// A binding identifier may be omitted (default-exported anonymous function/class).
        OPTIONAL_IDENTIFIER = 13;
        /// At statement position (controls whether `{` opens a block or an object literal).
        STATEMENT = 14;
        /// Parsing an object/class method (enables `super` property access).
        METHOD = 15;
        /// Parsing the callee/arguments of a `new` expression (suppresses call-without-`new.target`).
        NEW_EXPRESSION = 16;
        /// Parsing inside a dynamic `import()` call.
        DYNAMIC_IMPORT = 17;
        /// Inside JSX children (gates `<`/`>`/`{` lexing).
        JSX_CHILD = 18;
        /// Parsing an arrow function's concise (non-block) body.
        CONCISE_BODY = 19;
        /// Inside a parenthesized expression (used by the cover-grammar side channel).
        PARENTHESIS = 20;
        /// Parsing an arrow function head or body.
        ARROW = 21;
        /// Parsing an arrow head with exactly one, unparenthesized identifier parameter.
        SIMPLE_ARROW = 22;
        /// `super` is syntactically permitted (inside a derived class method).
        SUPER = 23;
        /// The enclosing class has a `constructor`.
        HAS_CONSTRUCTOR = 24;
        /// Annex B legacy syntax is permitted at this position (sloppy-mode function-in-block, etc.).
        ANNEX_B = 25;
        /// Parsing the body of an `if` clause (affects the dangling-`function`-declaration Annex B carve-out).
        IF_CLAUSE = 26;
        /// Stage-3 syntax past the ES2018 baseline is enabled (`ParserOptions::next`).
        ALLOW_NEXT = 27;
        /// V8/Babel `do`/`throw` expression extensions are enabled (`ParserOptions::v8`).
        ALLOW_V8 = 28;
        /// JSX grammar is enabled (`ParserOptions::jsx`).
        ALLOW_JSX = 29;
    }

    #[inline(always)]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline(always)]
    #[must_use]
    pub const fn contains(self, other: Context) -> bool {
        self.0 & other.0 == other.0
    }

    /// Derive a child context with `other`'s bits added.
    #[inline(always)]
    #[must_use]
    pub const fn with(self, other: Context) -> Self {
        Self(self.0 | other.0)
    }

    /// Derive a child context with `other`'s bits cleared.
    #[inline(always)]
    #[must_use]
    pub const fn without(self, other: Context) -> Self {
        Self(self.0 & !other.0)
    }

    /// Derive a child context that has `other`'s bits set to exactly the given `value`.
    #[inline(always)]
    #[must_use]
    pub const fn set(self, other: Context, value: bool) -> Self {
        if value {
            self.with(other)
        } else {
            self.without(other)
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_strict(self) -> bool {
        self.contains(Self::STRICT)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_module(self) -> bool {
        self.contains(Self::MODULE)
    }
}

impl BitOr for Context {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for Context {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

/// Mutable, sticky-across-tokens lexer/parser flags, separate from
/// [`Context`] because they are not value-typed: they persist on the parser
/// across calls rather than being threaded per recursive call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserFlags {
    /// Set when the whitespace/comments preceding the current token crossed a line terminator.
    pub line_terminator_before: bool,
    /// The previous parenthesized-expression group contained a `...` rest element.
    pub has_rest: bool,
    /// The previous parenthesized-expression group contained a member expression.
    pub has_member_expression: bool,
    /// The previous parenthesized-expression group itself contained a parenthesized child.
    pub wrapped_in_paren: bool,
    /// The previous parenthesized-expression group ended in a trailing comma.
    pub trailing_comma: bool,
    /// The previous parenthesized-expression group referenced `eval`/`arguments`.
    pub reserved_name: bool,
    /// The parameter list currently being parsed is non-simple (has a default, rest, or pattern).
    pub non_simple_parameter: bool,
}

impl ParserFlags {
    /// Reset the cover-grammar side channel before parsing a new parenthesized group.
    #[inline]
    pub(crate) fn reset_paren_signals(&mut self) {
        self.has_rest = false;
        self.has_member_expression = false;
        self.wrapped_in_paren = false;
        self.trailing_comma = false;
        self.reserved_name = false;
    }
}
