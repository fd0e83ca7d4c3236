//! Operator-precedence parser for infix formulas.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?          right-associative, -x^2 = -(x^2)
//! primary := number | ident | ident '(' expr ')' | '(' expr ')'
//! ```
//!
//! The grammar is implemented with an operand stack and an operator stack
//! instead of recursion, so neither long chains nor deep parentheses grow the
//! call stack. The nodes are pushed raw, without folding: parsing a rendered
//! formula gives back the tree it was rendered from.

use log::trace;

use crate::error::SymbolicError;
use crate::symbolic::lexer::{tokenize, SpannedToken, Token};
use crate::symbolic::term::{Func, Term, TermIdx, TermNode};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Infix {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Infix {
    fn from_token(token: Token) -> Option<Infix> {
        let op = match token {
            Token::Plus => Infix::Add,
            Token::Minus => Infix::Sub,
            Token::Star => Infix::Mul,
            Token::Slash => Infix::Div,
            Token::Caret => Infix::Pow,
            _ => return None,
        };
        Some(op)
    }

    fn precedence(self) -> u8 {
        match self {
            Infix::Add | Infix::Sub => 1,
            Infix::Mul | Infix::Div => 2,
            Infix::Pow => 4,
        }
    }

    fn node(self, a: TermIdx, b: TermIdx) -> TermNode {
        match self {
            Infix::Add => TermNode::Add(a, b),
            Infix::Sub => TermNode::Sub(a, b),
            Infix::Mul => TermNode::Mul(a, b),
            Infix::Div => TermNode::Div(a, b),
            Infix::Pow => TermNode::Pow(a, b),
        }
    }
}

/// Binds tighter than `*` and looser than `^`.
const NEG_PRECEDENCE: u8 = 3;

#[derive(Debug, Copy, Clone, PartialEq)]
enum Pending {
    Neg,
    Infix(Infix),
    /// An open parenthesis, possibly the argument list of a call.
    Open(Option<Func>),
}

pub fn parse(input: &str) -> Result<Term, SymbolicError> {
    trace!("parse({:?})", input);

    let tokens = tokenize(input).map_err(|position| SymbolicError::Parse {
        message: "invalid character".to_string(),
        position,
    })?;

    let mut parser = Parser {
        term: Term::empty(),
        operands: Vec::new(),
        operators: Vec::new(),
        end: input.len(),
    };
    parser.run(&tokens)?;
    Ok(parser.term)
}

struct Parser {
    term: Term,
    operands: Vec<TermIdx>,
    operators: Vec<Pending>,
    end: usize,
}

impl Parser {
    fn error(&self, token: Option<&SpannedToken<'_>>, message: &str) -> SymbolicError {
        match token {
            Some(t) => SymbolicError::Parse {
                message: format!("{} (found '{}')", message, t.lexeme),
                position: t.position,
            },
            None => SymbolicError::Parse {
                message: format!("{} (found end of input)", message),
                position: self.end,
            },
        }
    }

    fn run(&mut self, tokens: &[SpannedToken<'_>]) -> Result<(), SymbolicError> {
        let mut expect_operand = true;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            i += 1;

            if !expect_operand {
                if let Some(op) = Infix::from_token(token.token) {
                    self.reduce_before(op);
                    self.operators.push(Pending::Infix(op));
                    expect_operand = true;
                } else if token.token == Token::RParen {
                    self.close(token)?;
                } else {
                    return Err(self.error(Some(token), "expected operator"));
                }
                continue;
            }

            match token.token {
                Token::Number => {
                    let x = token
                        .lexeme
                        .parse::<f64>()
                        .map_err(|_| self.error(Some(token), "invalid number"))?;
                    let idx = self.term.num(x);
                    self.operands.push(idx);
                    expect_operand = false;
                }
                Token::Ident if tokens.get(i).map(|t| t.token) == Some(Token::LParen) => {
                    let func = Func::from_name(token.lexeme)
                        .ok_or_else(|| SymbolicError::UnknownFunction(token.lexeme.to_string()))?;
                    self.operators.push(Pending::Open(Some(func)));
                    i += 1;
                }
                Token::Ident => {
                    let idx = self.term.sym(token.lexeme);
                    self.operands.push(idx);
                    expect_operand = false;
                }
                Token::LParen => self.operators.push(Pending::Open(None)),
                Token::Minus => self.operators.push(Pending::Neg),
                Token::Plus => {}
                _ => return Err(self.error(Some(token), "expected operand")),
            }
        }

        if expect_operand {
            return Err(self.error(None, "expected operand"));
        }
        while let Some(pending) = self.operators.pop() {
            if let Pending::Open(_) = pending {
                return Err(self.error(None, "expected ')'"));
            }
            self.apply(pending);
        }

        let root = self.operands.pop().expect("one operand left");
        debug_assert!(self.operands.is_empty());
        self.term.set_root(root);
        Ok(())
    }

    /// Applies every pending operator that binds at least as tight as `op`
    /// on its left.
    fn reduce_before(&mut self, op: Infix) {
        while let Some(&top) = self.operators.last() {
            let precedence = match top {
                Pending::Open(_) => break,
                Pending::Neg => NEG_PRECEDENCE,
                Pending::Infix(t) => t.precedence(),
            };
            // `^` is right-associative: an equal `^` on the stack waits.
            if precedence < op.precedence() || (precedence == op.precedence() && op == Infix::Pow) {
                break;
            }
            self.operators.pop();
            self.apply(top);
        }
    }

    /// Handles `)`: reduces down to the matching `(` and applies the call
    /// it belongs to, if any.
    fn close(&mut self, token: &SpannedToken<'_>) -> Result<(), SymbolicError> {
        loop {
            match self.operators.pop() {
                Some(Pending::Open(call)) => {
                    if let Some(func) = call {
                        let arg = self.operands.pop().expect("call argument");
                        let idx = self.term.push(TermNode::Call(func, arg));
                        self.operands.push(idx);
                    }
                    return Ok(());
                }
                Some(pending) => self.apply(pending),
                None => return Err(self.error(Some(token), "unbalanced ')'")),
            }
        }
    }

    fn apply(&mut self, pending: Pending) {
        let node = match pending {
            Pending::Neg => TermNode::Neg(self.operands.pop().expect("operand of '-'")),
            Pending::Infix(op) => {
                let b = self.operands.pop().expect("right operand");
                let a = self.operands.pop().expect("left operand");
                op.node(a, b)
            }
            Pending::Open(_) => unreachable!("parentheses are closed explicitly"),
        };
        let idx = self.term.push(node);
        self.operands.push(idx);
    }
}
