//! AST node types for the minif language.
//!
//! Every node carries a [`Span`] for error reporting. Each node owns its
//! children exclusively; the tree has no sharing and no cycles.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// `program Name … end program`
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: Ident,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    Assign(Assign),
    ArrayAssign(ArrayAssign),
    List(ListStmt),
    If(IfStmt),
    While(WhileStmt),
    Block(BlockStmt),
    EnumDecl(EnumDecl),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::ArrayAssign(s) => s.span,
            Stmt::List(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::EnumDecl(s) => s.span,
        }
    }
}

/// `var name = init`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Ident,
    pub init: Expr,
    pub span: Span,
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `name[index] = value`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAssign {
    pub name: Ident,
    pub index: Expr,
    pub value: Expr,
    pub span: Span,
}

/// `list name`
#[derive(Debug, Clone, PartialEq)]
pub struct ListStmt {
    pub name: Ident,
    pub span: Span,
}

/// `if cond do … [else …] end`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    /// `None` when there is no `else`; `Some(vec![])` for an empty `else`.
    pub else_body: Option<Vec<Stmt>>,
    pub span: Span,
}

/// `while cond do … end`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `do … end`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `enum Name { A, B, C }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Ident,
    pub members: Vec<Ident>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self.kind, ExprKind::StringLit(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    NumberLit(f64),
    StringLit(String),
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `[a, b, c]`
    ArrayLit(Vec<Expr>),
    /// `name[index]`
    ArrayAccess {
        name: Ident,
        index: Box<Expr>,
    },
    /// `Enum.Member`
    EnumAccess {
        enum_name: Ident,
        member: Ident,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`, a no-op.
    Plus,
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    /// Compile-time concatenation of two string literals.
    Concat,
}

impl BinOp {
    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::LessEq => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEq => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Concat => "concat",
        }
    }

    /// Single-character selector carried by the `OP` instruction.
    ///
    /// `and`, `or` and `concat` have dedicated lowerings and no selector.
    pub fn selector(self) -> Option<char> {
        Some(match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
            BinOp::Eq => '=',
            BinOp::NotEq => '~',
            BinOp::Less => '<',
            BinOp::Greater => '>',
            BinOp::LessEq => '[',
            BinOp::GreaterEq => ']',
            BinOp::And | BinOp::Or | BinOp::Concat => return None,
        })
    }
}
