use crate::core::utils::identifiers::is_builtin_function;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    And,
    Or,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Geq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Neq
            | BinaryOp::Lt
            | BinaryOp::Leq
            | BinaryOp::Gt
            | BinaryOp::Geq => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div => 5,
            BinaryOp::Pow => 7,
        }
    }
}

const UNARY_PRECEDENCE: u8 = 6;
const ATOM_PRECEDENCE: u8 = 8;

/// A parsed mathematical expression attached to a kinetic law, rule, event or
/// other math-bearing element.
///
/// Identifier references appear as [`MathExpr::Symbol`] leaves and as the
/// callee of [`MathExpr::Call`] when it names a user function definition.
#[derive(Debug, Clone, PartialEq)]
pub enum MathExpr {
    Number(f64),
    Symbol(String),
    Unary {
        op: UnaryOp,
        operand: Box<MathExpr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<MathExpr>,
        rhs: Box<MathExpr>,
    },
    Call {
        function: String,
        args: Vec<MathExpr>,
    },
}

impl MathExpr {
    pub fn symbol(name: impl Into<String>) -> Self {
        MathExpr::Symbol(name.into())
    }

    pub fn binary(op: BinaryOp, lhs: MathExpr, rhs: MathExpr) -> Self {
        MathExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Rewrites every reference to `old_id` into `new_id`, returning how many
    /// references were changed. Calls to built-in functions are never touched.
    pub fn rename_symbol(&mut self, old_id: &str, new_id: &str) -> usize {
        match self {
            MathExpr::Number(_) => 0,
            MathExpr::Symbol(name) => {
                if name == old_id {
                    *name = new_id.to_string();
                    1
                } else {
                    0
                }
            }
            MathExpr::Unary { operand, .. } => operand.rename_symbol(old_id, new_id),
            MathExpr::Binary { lhs, rhs, .. } => {
                lhs.rename_symbol(old_id, new_id) + rhs.rename_symbol(old_id, new_id)
            }
            MathExpr::Call { function, args } => {
                let mut count = 0;
                if function == old_id && !is_builtin_function(function) {
                    *function = new_id.to_string();
                    count += 1;
                }
                count
                    + args
                        .iter_mut()
                        .map(|arg| arg.rename_symbol(old_id, new_id))
                        .sum::<usize>()
            }
        }
    }

    pub fn references(&self, id: &str) -> bool {
        match self {
            MathExpr::Number(_) => false,
            MathExpr::Symbol(name) => name == id,
            MathExpr::Unary { operand, .. } => operand.references(id),
            MathExpr::Binary { lhs, rhs, .. } => lhs.references(id) || rhs.references(id),
            MathExpr::Call { function, args } => {
                (function == id && !is_builtin_function(function))
                    || args.iter().any(|arg| arg.references(id))
            }
        }
    }

    /// Collects referenced identifiers in order of first appearance.
    pub fn referenced_symbols(&self) -> Vec<&str> {
        let mut symbols = Vec::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            MathExpr::Number(_) => {}
            MathExpr::Symbol(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            MathExpr::Unary { operand, .. } => operand.collect_symbols(out),
            MathExpr::Binary { lhs, rhs, .. } => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
            MathExpr::Call { function, args } => {
                if !is_builtin_function(function) && !out.contains(&function.as_str()) {
                    out.push(function);
                }
                for arg in args {
                    arg.collect_symbols(out);
                }
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            MathExpr::Binary { op, .. } => op.precedence(),
            MathExpr::Unary { .. } => UNARY_PRECEDENCE,
            MathExpr::Number(value) if *value < 0.0 => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &MathExpr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for MathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathExpr::Number(value) => write!(f, "{}", value),
            MathExpr::Symbol(name) => f.write_str(name),
            MathExpr::Unary { op, operand } => {
                f.write_str(match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                })?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
            MathExpr::Binary { op, lhs, rhs } => {
                let precedence = op.precedence();
                if *op == BinaryOp::Pow {
                    write_operand(f, lhs, lhs.precedence() <= precedence)?;
                    f.write_str("^")?;
                    write_operand(f, rhs, rhs.precedence() < precedence)
                } else {
                    write_operand(f, lhs, lhs.precedence() < precedence)?;
                    write!(f, " {} ", op.symbol())?;
                    write_operand(f, rhs, rhs.precedence() <= precedence)
                }
            }
            MathExpr::Call { function, args } => {
                write!(f, "{}(", function)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathParseError {
    #[error("Empty expression")]
    Empty,
    #[error("Unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("Invalid number literal '{literal}' at offset {offset}")]
    InvalidNumber { literal: String, offset: usize },
    #[error("Unexpected token '{found}' at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },
    #[error("Unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Op(&'static str),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{}", value),
            Token::Ident(name) => f.write_str(name),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Op(op) => f.write_str(op),
        }
    }
}

const TWO_CHAR_OPERATORS: [&str; 6] = ["==", "!=", "<=", ">=", "&&", "||"];

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, MathParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos] as char;
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit)) {
            let start = pos;
            while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                pos += 1;
            }
            if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
                let mut lookahead = pos + 1;
                if lookahead < bytes.len() && (bytes[lookahead] == b'+' || bytes[lookahead] == b'-')
                {
                    lookahead += 1;
                }
                if lookahead < bytes.len() && bytes[lookahead].is_ascii_digit() {
                    pos = lookahead;
                    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let literal = &input[start..pos];
            let value = literal
                .parse::<f64>()
                .map_err(|_| MathParseError::InvalidNumber {
                    literal: literal.to_string(),
                    offset: start,
                })?;
            tokens.push((Token::Number(value), start));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                pos += 1;
            }
            tokens.push((Token::Ident(input[start..pos].to_string()), start));
            continue;
        }

        if let Some(op) = TWO_CHAR_OPERATORS
            .iter()
            .find(|op| input[pos..].starts_with(**op))
        {
            tokens.push((Token::Op(*op), pos));
            pos += 2;
            continue;
        }

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '+' => Token::Op("+"),
            '-' => Token::Op("-"),
            '*' => Token::Op("*"),
            '/' => Token::Op("/"),
            '^' => Token::Op("^"),
            '<' => Token::Op("<"),
            '>' => Token::Op(">"),
            '!' => Token::Op("!"),
            _ => {
                return Err(MathParseError::UnexpectedCharacter {
                    character: input[pos..].chars().next().unwrap_or(c),
                    offset: pos,
                });
            }
        };
        tokens.push((token, pos));
        pos += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.cursor).cloned();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn peek_op(&self, candidates: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) => candidates.iter().copied().find(|c| c == op),
            _ => None,
        }
    }

    fn expect(&mut self, wanted: Token, expected: &'static str) -> Result<(), MathParseError> {
        match self.advance() {
            Some((token, _)) if token == wanted => Ok(()),
            Some((token, offset)) => Err(MathParseError::UnexpectedToken {
                found: token.to_string(),
                offset,
                expected,
            }),
            None => Err(MathParseError::UnexpectedEnd { expected }),
        }
    }

    fn parse_binary_level(
        &mut self,
        operators: &[&'static str],
        next: fn(&mut Self) -> Result<MathExpr, MathParseError>,
    ) -> Result<MathExpr, MathParseError> {
        let mut lhs = next(self)?;
        while let Some(op) = self.peek_op(operators) {
            self.cursor += 1;
            let rhs = next(self)?;
            lhs = MathExpr::binary(binary_op_for(op), lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<MathExpr, MathParseError> {
        self.parse_binary_level(&["||"], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<MathExpr, MathParseError> {
        self.parse_binary_level(&["&&"], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<MathExpr, MathParseError> {
        self.parse_binary_level(&["==", "!=", "<=", ">=", "<", ">"], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<MathExpr, MathParseError> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<MathExpr, MathParseError> {
        self.parse_binary_level(&["*", "/"], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<MathExpr, MathParseError> {
        if let Some(op) = self.peek_op(&["-", "!", "+"]) {
            self.cursor += 1;
            let operand = self.parse_unary()?;
            return Ok(match op {
                "+" => operand,
                "-" => MathExpr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                _ => MathExpr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
            });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<MathExpr, MathParseError> {
        let base = self.parse_primary()?;
        if self.peek_op(&["^"]).is_some() {
            self.cursor += 1;
            let exponent = self.parse_unary()?;
            return Ok(MathExpr::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<MathExpr, MathParseError> {
        const EXPECTED: &str = "a number, identifier or '('";
        match self.advance() {
            Some((Token::Number(value), _)) => Ok(MathExpr::Number(value)),
            Some((Token::Ident(name), _)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.cursor += 1;
                    let args = self.parse_arguments()?;
                    Ok(MathExpr::Call {
                        function: name,
                        args,
                    })
                } else {
                    Ok(MathExpr::Symbol(name))
                }
            }
            Some((Token::LParen, _)) => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some((token, offset)) => Err(MathParseError::UnexpectedToken {
                found: token.to_string(),
                offset,
                expected: EXPECTED,
            }),
            None => Err(MathParseError::UnexpectedEnd { expected: EXPECTED }),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<MathExpr>, MathParseError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.cursor += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            match self.advance() {
                Some((Token::Comma, _)) => continue,
                Some((Token::RParen, _)) => return Ok(args),
                Some((token, offset)) => {
                    return Err(MathParseError::UnexpectedToken {
                        found: token.to_string(),
                        offset,
                        expected: "',' or ')'",
                    });
                }
                None => {
                    return Err(MathParseError::UnexpectedEnd {
                        expected: "',' or ')'",
                    });
                }
            }
        }
    }
}

fn binary_op_for(op: &str) -> BinaryOp {
    match op {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "^" => BinaryOp::Pow,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::Neq,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Leq,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Geq,
        "&&" => BinaryOp::And,
        _ => BinaryOp::Or,
    }
}

impl FromStr for MathExpr {
    type Err = MathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        if tokens.is_empty() {
            return Err(MathParseError::Empty);
        }
        let mut parser = Parser { tokens, cursor: 0 };
        let expr = parser.parse_or()?;
        if let Some((token, offset)) = parser.advance() {
            return Err(MathParseError::UnexpectedToken {
                found: token.to_string(),
                offset,
                expected: "end of expression",
            });
        }
        Ok(expr)
    }
}
