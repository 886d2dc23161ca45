use super::ConditionError;
use super::lexer::{Token, tokenize};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    /// Dotted field access, e.g. `doc.status` -> ["doc", "status"].
    Path(Vec<String>),
    Call { name: String, args: Vec<Expr> },
    Not(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Add,
    Sub,
}

pub fn parse(input: &str) -> Result<Expr, ConditionError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ConditionError::Parse(format!(
            "unexpected trailing input at token {}",
            parser.pos
        )));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ConditionError> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(ConditionError::Parse(format!(
                "expected {expected:?}, found {token:?}"
            ))),
            None => Err(ConditionError::Parse(format!(
                "expected {expected:?}, found end of input"
            ))),
        }
    }

    fn or_expr(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let rhs = self.and_expr()?;
            lhs = Expr::Binary {
                op: BinOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.not_expr()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let rhs = self.not_expr()?;
            lhs = Expr::Binary {
                op: BinOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr, ConditionError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.not_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ConditionError> {
        let lhs = self.sum()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinOp::Eq,
            Some(Token::Ne) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            Some(Token::In) => BinOp::In,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.sum()?;
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn sum(&mut self) -> Result<Expr, ConditionError> {
        let mut lhs = self.atom()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.atom()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn atom(&mut self) -> Result<Expr, ConditionError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Null) => Ok(Expr::Null),
            Some(Token::Minus) => {
                // Negative number literal
                match self.advance() {
                    Some(Token::Number(n)) => Ok(Expr::Number(-n)),
                    other => Err(ConditionError::Parse(format!(
                        "expected number after '-', found {other:?}"
                    ))),
                }
            }
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.or_expr()?);
                            if self.peek() == Some(&Token::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(&Token::RParen)?;
                    return Ok(Expr::Call { name, args });
                }

                let mut path = vec![name];
                while self.peek() == Some(&Token::Dot) {
                    self.advance();
                    match self.advance() {
                        Some(Token::Ident(segment)) => path.push(segment),
                        other => {
                            return Err(ConditionError::Parse(format!(
                                "expected field name after '.', found {other:?}"
                            )));
                        }
                    }
                }
                Ok(Expr::Path(path))
            }
            Some(token) => Err(ConditionError::Parse(format!(
                "unexpected token {token:?}"
            ))),
            None => Err(ConditionError::Parse("unexpected end of input".to_string())),
        }
    }
}
