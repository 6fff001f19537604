use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(0);

/// Hands out the identity key under which the resolver records a binding
/// distance for a `Variable`, `Assign`, `This`, or `Super` node.  Ids are
/// unique for the lifetime of the process so a REPL session never aliases
/// nodes across lines.
pub fn next_node_id() -> usize {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug)]
pub enum Expr {
    // Literal value carried on its token (NUMBER, STRING, TRUE, FALSE, NIL)
    Literal(Token),

    // Parenthesized grouped expression
    Grouping(Box<Expr>),

    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // 'and' / 'or' are kept apart from Binary so evaluation can short-circuit
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Variable {
        id: usize,
        name: Token,
    },

    Assign {
        id: usize,
        name: Token,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    // Property read: object.name
    Get {
        object: Box<Expr>,
        name: Token,
    },

    // Property write: object.name = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This {
        id: usize,
        keyword: Token,
    },

    Super {
        id: usize,
        keyword: Token,
        method: Token,
    },
}
