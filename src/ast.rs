//! Syntax tree produced by the parser and walked by the interpreter.
//!
//! Every node owns its children. Function declarations sit behind an `Rc` so
//! that the environment can keep a handle to a declared function after the
//! declaring statement has finished executing.

use std::rc::Rc;

use crate::token::Span;

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(Literal),
    Variable(String),
    Array(Vec<Expression>),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Logical {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    Assign {
        target: Box<Expression>,
        mode: AssignMode,
        value: Box<Expression>,
    },
    /// `++x`, `x++`, `--x`, `x--`.
    Step {
        target: Box<Expression>,
        op: StepOperator,
        postfix: bool,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    /// `object.name` or `object.name(args)`; `args` is `None` without parentheses.
    Member {
        object: Box<Expression>,
        name: String,
        args: Option<Vec<Expression>>,
    },
    Call {
        name: String,
        args: Vec<Expression>,
    },
    New {
        type_name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Whether evaluating this node yields an assignable slot.
    pub fn is_lvalue(&self) -> bool {
        matches!(self, Expression::Variable(_) | Expression::Index { .. })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepOperator {
    Increment,
    Decrement,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AssignMode {
    Simple,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignMode {
    /// Operator applied before storing, `None` for plain `=`.
    pub fn operator(self) -> Option<BinaryOperator> {
        match self {
            Self::Simple => None,
            Self::Add => Some(BinaryOperator::Add),
            Self::Sub => Some(BinaryOperator::Sub),
            Self::Mul => Some(BinaryOperator::Mul),
            Self::Div => Some(BinaryOperator::Div),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    Expr(Expression),
    Declare {
        name: String,
        initializer: Option<Expression>,
    },
    Block(Block),
    If {
        branches: Vec<(Expression, Block)>,
        else_block: Option<Block>,
    },
    While {
        condition: Expression,
        body: Block,
    },
    For {
        init: Option<Box<Statement>>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Block,
    },
    Break,
    Continue,
    Return(Option<Expression>),
    Exit(Option<Expression>),
    Print {
        format: String,
        args: Vec<Expression>,
    },
    Function(Rc<FunctionDecl>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}
