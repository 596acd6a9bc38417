//! The syntax tree produced by a successful parse: an
//! [ESTree](https://github.com/estree/estree)-shaped node hierarchy, each
//! variant `#[derive(Serialize)]` so [`crate::parse_script`]'s result can be
//! handed straight to `serde_json::to_string` for tools that expect ESTree
//! JSON.
//!
//! Every node carries an optional `start`/`end`/`loc` triple, populated only
//! when [`crate::ParserOptions::ranges`] / `locations` ask for it, matching
//! the way real ESTree producers make position info opt-in.

use crate::position::Span;
use serde::Serialize;
use smartstring::alias::String as Atom;

/// Wraps a node's optional position fields so every AST struct can embed one
/// `#[serde(flatten)]` field instead of repeating four `Option` fields.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NodeLoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SourceLocation {
    pub start: LineColumn,
    pub end: LineColumn,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

impl NodeLoc {
    pub(crate) fn from_span(span: Span, ranges: bool, locations: bool) -> Self {
        Self {
            start: ranges.then_some(span.start),
            end: ranges.then_some(span.end),
            loc: locations.then_some(SourceLocation {
                start: LineColumn { line: span.start_pos.line, column: span.start_pos.column },
                end: LineColumn { line: span.end_pos.line, column: span.end_pos.column },
            }),
        }
    }
}

/// The root node. `source_type` records whether this tree came from
/// [`crate::parse_script`] or [`crate::parse_module`].
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    #[serde(flatten)]
    pub loc: NodeLoc,
    pub body: Vec<Statement>,
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<crate::comments::Comment>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Script,
    Module,
}

macro_rules! node {
    ($name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        #[derive(Debug, Clone, Serialize)]
        pub struct $name {
            #[serde(rename = "type")]
            pub node_type: &'static str,
            #[serde(flatten)]
            pub loc: NodeLoc,
            $(pub $field: $ty,)*
        }
    };
}

// ---- identifiers & literals ----------------------------------------------------------

node!(Identifier { name: Atom });
node!(PrivateIdentifier { name: Atom });

#[derive(Debug, Clone, Serialize)]
pub struct Literal {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    #[serde(flatten)]
    pub loc: NodeLoc,
    pub value: LiteralValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Atom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegExpLiteralInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bigint: Option<Atom>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(f64),
    String(Atom),
    /// Regex and BigInt literals have no exact host value; ESTree encodes
    /// them with `value: {}`/`value: null` and the detail on a sibling field.
    Unrepresentable,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegExpLiteralInfo {
    pub pattern: Atom,
    pub flags: Atom,
}

node!(TemplateElement {
    tail: bool,
    cooked: Option<Atom>,
    raw: Atom,
});

node!(TemplateLiteral {
    quasis: Vec<TemplateElement>,
    expressions: Vec<Expression>,
});

node!(TaggedTemplateExpression {
    tag: Box<Expression>,
    quasi: TemplateLiteral,
});

// ---- expressions ----------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Expression {
    Identifier(Identifier),
    PrivateIdentifier(PrivateIdentifier),
    Literal(Literal),
    ThisExpression(ThisExpression),
    Super(Super),
    ArrayExpression(ArrayExpression),
    ObjectExpression(ObjectExpression),
    FunctionExpression(FunctionExpression),
    ArrowFunctionExpression(ArrowFunctionExpression),
    ClassExpression(ClassExpression),
    TaggedTemplateExpression(TaggedTemplateExpression),
    TemplateLiteral(TemplateLiteral),
    MemberExpression(MemberExpression),
    CallExpression(CallExpression),
    NewExpression(NewExpression),
    UpdateExpression(UpdateExpression),
    UnaryExpression(UnaryExpression),
    BinaryExpression(BinaryExpression),
    LogicalExpression(LogicalExpression),
    AssignmentExpression(AssignmentExpression),
    ConditionalExpression(ConditionalExpression),
    SequenceExpression(SequenceExpression),
    YieldExpression(YieldExpression),
    AwaitExpression(AwaitExpression),
    DoExpression(DoExpression),
    ThrowExpression(ThrowExpression),
    ImportExpression(ImportExpression),
    MetaProperty(MetaProperty),
    SpreadElement(SpreadElement),
    AssignmentPattern(AssignmentPattern),
    ArrayPattern(ArrayPattern),
    ObjectPattern(ObjectPattern),
    RestElement(RestElement),
    JsxElement(JsxElement),
    JsxFragment(JsxFragment),
}

node!(ThisExpression {});
node!(Super {});

node!(ArrayExpression { elements: Vec<Option<Expression>> });

node!(ObjectExpression { properties: Vec<ObjectExpressionProperty> });

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ObjectExpressionProperty {
    Property(Property),
    SpreadElement(SpreadElement),
}

node!(Property {
    key: Box<Expression>,
    value: Box<Expression>,
    kind: PropertyKind,
    method: bool,
    shorthand: bool,
    computed: bool,
});

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

node!(SpreadElement { argument: Box<Expression> });
node!(RestElement { argument: Box<Pattern> });

node!(FunctionExpression {
    id: Option<Identifier>,
    params: Vec<Pattern>,
    body: BlockStatement,
    generator: bool,
    is_async: bool,
});

node!(ArrowFunctionExpression {
    id: Option<Identifier>,
    params: Vec<Pattern>,
    body: ArrowFunctionBody,
    expression: bool,
    generator: bool,
    is_async: bool,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ArrowFunctionBody {
    Block(Box<BlockStatement>),
    Expression(Box<Expression>),
}

node!(MemberExpression {
    object: Box<MemberObject>,
    property: Box<Expression>,
    computed: bool,
    optional: bool,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MemberObject {
    Expression(Expression),
    Super(Super),
}

node!(CallExpression {
    callee: Box<CallCallee>,
    arguments: Vec<Expression>,
    optional: bool,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CallCallee {
    Expression(Expression),
    Super(Super),
    Import(Import),
}

node!(Import {});
node!(ImportExpression { source: Box<Expression> });
node!(MetaProperty { meta: Identifier, property: Identifier });

node!(NewExpression {
    callee: Box<Expression>,
    arguments: Vec<Expression>,
});

#[derive(Debug, Clone, Copy, Serialize)]
pub enum UpdateOperator {
    #[serde(rename = "++")]
    Increment,
    #[serde(rename = "--")]
    Decrement,
}

node!(UpdateExpression {
    operator: UpdateOperator,
    argument: Box<Expression>,
    prefix: bool,
});

#[derive(Debug, Clone, Copy, Serialize)]
pub enum UnaryOperator {
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitwiseNot,
    #[serde(rename = "typeof")]
    Typeof,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "delete")]
    Delete,
}

node!(UnaryExpression {
    operator: UnaryOperator,
    prefix: bool,
    argument: Box<Expression>,
});

#[derive(Debug, Clone, Copy, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!==")]
    StrictNotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = ">>>")]
    UShr,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Times,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "**")]
    Exp,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "instanceof")]
    Instanceof,
}

node!(BinaryExpression {
    operator: BinaryOperator,
    left: Box<Expression>,
    right: Box<Expression>,
});

#[derive(Debug, Clone, Copy, Serialize)]
pub enum LogicalOperator {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "??")]
    Coalesce,
}

node!(LogicalExpression {
    operator: LogicalOperator,
    left: Box<Expression>,
    right: Box<Expression>,
});

#[derive(Debug, Clone, Copy, Serialize)]
pub enum AssignmentOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    PlusAssign,
    #[serde(rename = "-=")]
    MinusAssign,
    #[serde(rename = "*=")]
    TimesAssign,
    #[serde(rename = "/=")]
    DivAssign,
    #[serde(rename = "%=")]
    ModAssign,
    #[serde(rename = "**=")]
    ExpAssign,
    #[serde(rename = "<<=")]
    ShlAssign,
    #[serde(rename = ">>=")]
    ShrAssign,
    #[serde(rename = ">>>=")]
    UShrAssign,
    #[serde(rename = "|=")]
    BitOrAssign,
    #[serde(rename = "^=")]
    BitXorAssign,
    #[serde(rename = "&=")]
    BitAndAssign,
    #[serde(rename = "&&=")]
    AndAssign,
    #[serde(rename = "||=")]
    OrAssign,
    #[serde(rename = "??=")]
    CoalesceAssign,
}

node!(AssignmentExpression {
    operator: AssignmentOperator,
    left: Box<AssignmentTarget>,
    right: Box<Expression>,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AssignmentTarget {
    Expression(Expression),
    Pattern(Pattern),
}

node!(ConditionalExpression {
    test: Box<Expression>,
    consequent: Box<Expression>,
    alternate: Box<Expression>,
});

node!(SequenceExpression { expressions: Vec<Expression> });

node!(YieldExpression {
    argument: Option<Box<Expression>>,
    delegate: bool,
});

node!(AwaitExpression { argument: Box<Expression> });

// ---- patterns ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Pattern {
    Identifier(Identifier),
    ArrayPattern(ArrayPattern),
    ObjectPattern(ObjectPattern),
    AssignmentPattern(AssignmentPattern),
    RestElement(RestElement),
    MemberExpression(MemberExpression),
}

node!(ArrayPattern { elements: Vec<Option<Pattern>> });
node!(ObjectPattern { properties: Vec<ObjectPatternProperty> });

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ObjectPatternProperty {
    Property(AssignmentProperty),
    RestElement(RestElement),
}

node!(AssignmentProperty {
    key: Box<Expression>,
    value: Box<Pattern>,
    kind: PropertyKind,
    method: bool,
    shorthand: bool,
    computed: bool,
});

node!(AssignmentPattern {
    left: Box<Pattern>,
    right: Box<Expression>,
});

// ---- statements ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Statement {
    ExpressionStatement(ExpressionStatement),
    BlockStatement(BlockStatement),
    EmptyStatement(EmptyStatement),
    DebuggerStatement(DebuggerStatement),
    WithStatement(WithStatement),
    ReturnStatement(ReturnStatement),
    LabeledStatement(LabeledStatement),
    BreakStatement(BreakStatement),
    ContinueStatement(ContinueStatement),
    IfStatement(IfStatement),
    SwitchStatement(SwitchStatement),
    ThrowStatement(ThrowStatement),
    TryStatement(TryStatement),
    WhileStatement(WhileStatement),
    DoWhileStatement(DoWhileStatement),
    ForStatement(ForStatement),
    ForInStatement(ForInStatement),
    ForOfStatement(ForOfStatement),
    FunctionDeclaration(FunctionDeclaration),
    VariableDeclaration(VariableDeclaration),
    ClassDeclaration(ClassDeclaration),
    ImportDeclaration(ImportDeclaration),
    ExportNamedDeclaration(ExportNamedDeclaration),
    ExportDefaultDeclaration(ExportDefaultDeclaration),
    ExportAllDeclaration(ExportAllDeclaration),
}

node!(ExpressionStatement { expression: Expression });
node!(BlockStatement { body: Vec<Statement> });
node!(EmptyStatement {});
node!(DebuggerStatement {});
node!(WithStatement { object: Expression, body: Box<Statement> });
node!(ReturnStatement { argument: Option<Expression> });
node!(LabeledStatement { label: Identifier, body: Box<Statement> });
node!(BreakStatement { label: Option<Identifier> });
node!(ContinueStatement { label: Option<Identifier> });

node!(IfStatement {
    test: Expression,
    consequent: Box<Statement>,
    alternate: Option<Box<Statement>>,
});

node!(SwitchStatement {
    discriminant: Expression,
    cases: Vec<SwitchCase>,
});

node!(SwitchCase {
    test: Option<Expression>,
    consequent: Vec<Statement>,
});

node!(ThrowStatement { argument: Expression });

node!(TryStatement {
    block: BlockStatement,
    handler: Option<CatchClause>,
    finalizer: Option<BlockStatement>,
});

node!(CatchClause {
    param: Option<Pattern>,
    body: BlockStatement,
});

node!(WhileStatement { test: Expression, body: Box<Statement> });
node!(DoWhileStatement { body: Box<Statement>, test: Expression });

node!(ForStatement {
    init: Option<Box<ForInit>>,
    test: Option<Expression>,
    update: Option<Expression>,
    body: Box<Statement>,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ForInit {
    VariableDeclaration(VariableDeclaration),
    Expression(Expression),
}

node!(ForInStatement {
    left: ForHeadLeft,
    right: Expression,
    body: Box<Statement>,
});

node!(ForOfStatement {
    left: ForHeadLeft,
    right: Expression,
    body: Box<Statement>,
    is_await: bool,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ForHeadLeft {
    VariableDeclaration(VariableDeclaration),
    Pattern(Pattern),
}

node!(FunctionDeclaration {
    id: Option<Identifier>,
    params: Vec<Pattern>,
    body: BlockStatement,
    generator: bool,
    is_async: bool,
});

node!(VariableDeclaration {
    declarations: Vec<VariableDeclarator>,
    kind: VariableKind,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

node!(VariableDeclarator {
    id: Pattern,
    init: Option<Expression>,
});

// ---- classes ---------------------------------------------------------------------------

node!(ClassDeclaration {
    id: Option<Identifier>,
    super_class: Option<Box<Expression>>,
    body: ClassBody,
});

node!(ClassExpression {
    id: Option<Identifier>,
    super_class: Option<Box<Expression>>,
    body: ClassBody,
});

node!(ClassBody { body: Vec<ClassMember> });

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ClassMember {
    MethodDefinition(MethodDefinition),
    PropertyDefinition(PropertyDefinition),
    StaticBlock(StaticBlock),
}

node!(MethodDefinition {
    key: Box<Expression>,
    value: FunctionExpression,
    kind: MethodKind,
    computed: bool,
    is_static: bool,
});

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

node!(PropertyDefinition {
    key: Box<Expression>,
    value: Option<Box<Expression>>,
    computed: bool,
    is_static: bool,
});

node!(StaticBlock { body: Vec<Statement> });

// ---- modules ---------------------------------------------------------------------------

node!(ImportDeclaration {
    specifiers: Vec<ImportSpecifierKind>,
    source: Literal,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ImportSpecifierKind {
    Named(ImportSpecifier),
    Default(ImportDefaultSpecifier),
    Namespace(ImportNamespaceSpecifier),
}

node!(ImportSpecifier { imported: Identifier, local: Identifier });
node!(ImportDefaultSpecifier { local: Identifier });
node!(ImportNamespaceSpecifier { local: Identifier });

node!(ExportNamedDeclaration {
    declaration: Option<Box<Statement>>,
    specifiers: Vec<ExportSpecifier>,
    source: Option<Literal>,
});

node!(ExportSpecifier { local: Identifier, exported: Identifier });

node!(ExportDefaultDeclaration { declaration: Box<ExportDefaultDecl> });

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExportDefaultDecl {
    FunctionDeclaration(FunctionDeclaration),
    ClassDeclaration(ClassDeclaration),
    Expression(Expression),
}

node!(ExportAllDeclaration {
    source: Literal,
    exported: Option<Identifier>,
});

// ---- V8/Babel expression extensions -------------------------------------------------------

/// `do { ... }`, evaluating to the completion value of its last statement.
node!(DoExpression { body: BlockStatement });

/// `throw expr` used in expression position (e.g. `x ?? throw new Error()`).
node!(ThrowExpression { argument: Box<Expression> });

// ---- JSX ---------------------------------------------------------------------------------

node!(JsxElement {
    opening_element: JsxOpeningElement,
    children: Vec<JsxChild>,
    closing_element: Option<JsxClosingElement>,
});

node!(JsxFragment {
    children: Vec<JsxChild>,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsxChild {
    Element(JsxElement),
    Fragment(JsxFragment),
    ExpressionContainer(JsxExpressionContainer),
    Text(JsxText),
}

node!(JsxOpeningElement {
    name: JsxName,
    attributes: Vec<JsxAttributeKind>,
    self_closing: bool,
});

node!(JsxClosingElement { name: JsxName });

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsxName {
    Identifier(Identifier),
    MemberExpression(MemberExpression),
    NamespacedName(Box<JsxNamespacedName>),
}

node!(JsxNamespacedName { namespace: Identifier, name: Identifier });

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsxAttributeKind {
    Attribute(JsxAttribute),
    Spread(JsxSpreadAttribute),
}

node!(JsxAttribute {
    name: JsxName,
    value: Option<JsxAttributeValue>,
});

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsxAttributeValue {
    Literal(Literal),
    ExpressionContainer(JsxExpressionContainer),
    Element(JsxElement),
}

node!(JsxSpreadAttribute { argument: Expression });
node!(JsxExpressionContainer { expression: Option<Expression> });
node!(JsxText { value: Atom, raw: Atom });
