//! Default expression evaluator.
//!
//! Infix text is tokenized, reordered with a shunting-yard pass and run on a
//! stack of `rug::Float` values at the session's working precision.

use crate::config::AngleUnit;
use crate::error::EvalError;
use rug::float::Constant;
use rug::ops::Pow;
use rug::Float;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Variable name to value, as handed to an evaluator.
pub type Bindings = HashMap<String, f64>;

/// Resolves an expression string plus variable bindings to a number.
pub trait Evaluator {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<Float, EvalError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Acos,
    Asin,
    Atan,
    Ceiling,
    Cos,
    Exp,
    Floor,
    Ln,
    Log,
    Log10,
    Max,
    Min,
    Pow,
    Round,
    Sign,
    Sin,
    Sqrt,
    Tan,
    Truncate,
}

const FUNCTIONS: [(&str, Function, usize); 20] = [
    // (name, function, arguments)
    ("abs", Function::Abs, 1),
    ("acos", Function::Acos, 1),
    ("asin", Function::Asin, 1),
    ("atan", Function::Atan, 1),
    ("ceiling", Function::Ceiling, 1),
    ("cos", Function::Cos, 1),
    ("exp", Function::Exp, 1),
    ("floor", Function::Floor, 1),
    ("ln", Function::Ln, 1),
    ("log", Function::Log, 2), // Logarithm of x in base b
    ("log10", Function::Log10, 1),
    ("max", Function::Max, 2),
    ("min", Function::Min, 2),
    ("pow", Function::Pow, 2),
    ("round", Function::Round, 1), // Ties to even
    ("sign", Function::Sign, 1),
    ("sin", Function::Sin, 1),
    ("sqrt", Function::Sqrt, 1),
    ("tan", Function::Tan, 1),
    ("truncate", Function::Truncate, 1),
];

impl Function {
    /// Case-insensitive lookup.
    pub fn lookup(name: &str) -> Option<Function> {
        FUNCTIONS
            .iter()
            .find(|(entry, _, _)| entry.eq_ignore_ascii_case(name))
            .map(|&(_, function, _)| function)
    }

    pub fn name(self) -> &'static str {
        FUNCTIONS
            .iter()
            .find(|(_, function, _)| *function == self)
            .map_or("?", |&(name, _, _)| name)
    }

    pub fn arity(self) -> usize {
        FUNCTIONS
            .iter()
            .find(|(_, function, _)| *function == self)
            .map_or(1, |&(_, _, arity)| arity)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String, usize),
    Ident(String, usize),
    Operator(char, usize),
    LeftParen(usize),
    RightParen(usize),
    Comma(usize),
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug)]
enum Precedence {
    Lowest,
    Addition,
    Multiplication,
    UnaryNegation,
    Exponentiation,
}

fn get_precedence(op: char) -> Precedence {
    match op {
        '+' | '-' => Precedence::Addition,
        '*' | '/' | '%' => Precedence::Multiplication,
        '^' => Precedence::Exponentiation,
        'n' => Precedence::UnaryNegation,
        _ => Precedence::Lowest,
    }
}

#[derive(Debug)]
enum Rpn {
    Number(Float),
    Symbol(String),
    // 'n' is unary negation
    Operator(char),
    Call(Function, usize),
}

#[derive(Debug)]
enum Pending {
    Operator(char),
    Paren,
    Call(Function),
}

trait Modulus {
    fn modulus(self, divisor: Float) -> Float;
}

impl Modulus for Float {
    // Truncated remainder: the result takes the sign of the dividend.
    fn modulus(self, divisor: Float) -> Float {
        let quotient = Float::with_val(self.prec(), &self / &divisor).trunc();
        self - divisor * quotient
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < bytes.len() {
        let c = bytes[index];

        if c.is_ascii_whitespace() {
            index += 1;
            continue;
        }

        match c {
            b'(' => tokens.push(Token::LeftParen(index)),
            b')' => tokens.push(Token::RightParen(index)),
            b',' => tokens.push(Token::Comma(index)),
            b'+' | b'-' | b'*' | b'/' | b'%' | b'^' => {
                tokens.push(Token::Operator(c as char, index))
            }
            _ if c.is_ascii_digit() || c == b'.' => {
                let start = index;
                while index < bytes.len() && (bytes[index].is_ascii_digit() || bytes[index] == b'.')
                {
                    index += 1;
                }
                // Exponent only when digits follow, so `2e` stays number then constant.
                if index < bytes.len() && (bytes[index] == b'e' || bytes[index] == b'E') {
                    let mut lookahead = index + 1;
                    if lookahead < bytes.len() && (bytes[lookahead] == b'+' || bytes[lookahead] == b'-')
                    {
                        lookahead += 1;
                    }
                    if lookahead < bytes.len() && bytes[lookahead].is_ascii_digit() {
                        index = lookahead;
                        while index < bytes.len() && bytes[index].is_ascii_digit() {
                            index += 1;
                        }
                    }
                }
                tokens.push(Token::Number(input[start..index].to_owned(), start));
                continue;
            }
            _ if c.is_ascii_alphabetic() || c == b'_' => {
                let start = index;
                while index < bytes.len()
                    && (bytes[index].is_ascii_alphanumeric() || bytes[index] == b'_')
                {
                    index += 1;
                }
                tokens.push(Token::Ident(input[start..index].to_owned(), start));
                continue;
            }
            _ => {
                let unexpected = input[index..].chars().next().unwrap_or('?');
                return Err(EvalError::UnexpectedCharacter(unexpected, index));
            }
        }
        index += 1;
    }

    Ok(tokens)
}

fn pending_to_rpn(pending: Pending) -> Result<Rpn, EvalError> {
    match pending {
        Pending::Operator(op) => Ok(Rpn::Operator(op)),
        Pending::Paren | Pending::Call(_) => Err(EvalError::MismatchedParentheses),
    }
}

fn pop_until_paren(stack: &mut Vec<Pending>, output: &mut Vec<Rpn>) -> Result<(), EvalError> {
    loop {
        match stack.last() {
            Some(Pending::Paren) => return Ok(()),
            Some(_) => {
                if let Some(pending) = stack.pop() {
                    output.push(pending_to_rpn(pending)?);
                }
            }
            None => return Err(EvalError::MismatchedParentheses),
        }
    }
}

/// `rug::Float` evaluator with the functions listed in [`Function`] and the
/// constants `pi` and `e`. Variables shadow constants.
#[derive(Debug, Clone)]
pub struct RugEvaluator {
    precision: u32,
    angle: AngleUnit,
}

impl RugEvaluator {
    pub fn new(precision: u32, angle: AngleUnit) -> RugEvaluator {
        RugEvaluator { precision, angle }
    }

    fn parse_number(&self, text: &str) -> Result<Float, EvalError> {
        match Float::parse(text) {
            Ok(parsed) => Ok(Float::with_val(self.precision, parsed)),
            Err(_) => Err(EvalError::InvalidNumber(text.to_owned())),
        }
    }

    fn resolve(&self, name: &str, bindings: &Bindings) -> Result<Float, EvalError> {
        if let Some(&value) = bindings.get(name) {
            return Ok(Float::with_val(self.precision, value));
        }
        match name {
            "pi" => Ok(Float::with_val(self.precision, Constant::Pi)),
            "e" => Ok(Float::with_val(self.precision, 1).exp()),
            _ => Err(EvalError::UnknownSymbol(name.to_owned())),
        }
    }

    fn to_rpn(&self, tokens: &[Token]) -> Result<Vec<Rpn>, EvalError> {
        let mut output = Vec::new();
        let mut stack: Vec<Pending> = Vec::new();
        // One entry per open parenthesis: the argument count for calls, None for grouping.
        let mut arguments: Vec<Option<usize>> = Vec::new();
        let mut expect_operand = true;
        let mut iter = tokens.iter().peekable();

        while let Some(token) = iter.next() {
            match token {
                Token::Number(text, pos) => {
                    if !expect_operand {
                        return Err(EvalError::ExpectedOperator(*pos));
                    }
                    output.push(Rpn::Number(self.parse_number(text)?));
                    expect_operand = false;
                }
                Token::Ident(name, pos) => {
                    if !expect_operand {
                        return Err(EvalError::ExpectedOperator(*pos));
                    }
                    if matches!(iter.peek(), Some(Token::LeftParen(_))) {
                        let function = Function::lookup(name)
                            .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
                        iter.next();
                        stack.push(Pending::Call(function));
                        stack.push(Pending::Paren);
                        arguments.push(Some(1));
                    } else {
                        output.push(Rpn::Symbol(name.clone()));
                        expect_operand = false;
                    }
                }
                Token::LeftParen(pos) => {
                    if !expect_operand {
                        return Err(EvalError::ExpectedOperator(*pos));
                    }
                    stack.push(Pending::Paren);
                    arguments.push(None);
                }
                Token::Comma(pos) => {
                    if !matches!(arguments.last(), Some(Some(_))) {
                        return Err(EvalError::UnexpectedCharacter(',', *pos));
                    }
                    if expect_operand {
                        return Err(EvalError::ExpectedOperand(*pos));
                    }
                    pop_until_paren(&mut stack, &mut output)?;
                    if let Some(Some(count)) = arguments.last_mut() {
                        *count += 1;
                    }
                    expect_operand = true;
                }
                Token::RightParen(pos) => {
                    if expect_operand {
                        return Err(EvalError::ExpectedOperand(*pos));
                    }
                    pop_until_paren(&mut stack, &mut output)?;
                    stack.pop();
                    if let Some(Some(count)) = arguments.pop() {
                        if let Some(Pending::Call(function)) = stack.pop() {
                            output.push(Rpn::Call(function, count));
                        }
                    }
                    expect_operand = false;
                }
                Token::Operator(op, pos) => {
                    if expect_operand {
                        match op {
                            '-' => stack.push(Pending::Operator('n')),
                            '+' => {}
                            _ => return Err(EvalError::ExpectedOperand(*pos)),
                        }
                        continue;
                    }
                    while let Some(Pending::Operator(top)) = stack.last() {
                        let top = *top;
                        if get_precedence(top) > get_precedence(*op)
                            || (get_precedence(top) == get_precedence(*op) && *op != '^')
                        {
                            stack.pop();
                            output.push(Rpn::Operator(top));
                        } else {
                            break;
                        }
                    }
                    stack.push(Pending::Operator(*op));
                    expect_operand = true;
                }
            }
        }

        if tokens.is_empty() {
            return Err(EvalError::Empty);
        }
        if expect_operand {
            return Err(EvalError::Incomplete);
        }
        while let Some(pending) = stack.pop() {
            output.push(pending_to_rpn(pending)?);
        }

        Ok(output)
    }

    fn apply_operator(&self, op: char, a: Float, b: Float) -> Float {
        match op {
            '+' => a + b,
            '-' => a - b,
            '*' => a * b,
            '/' => a / b,
            '%' => a.modulus(b),
            '^' => a.pow(&b),
            _ => Float::with_val(self.precision, rug::float::Special::Nan),
        }
    }

    fn apply_function(&self, function: Function, mut args: Vec<Float>) -> Float {
        let pi = Float::with_val(self.precision, Constant::Pi);
        // Arity was checked by the caller.
        let b = if args.len() > 1 { args.pop() } else { None };
        let a = args.pop().unwrap_or_else(|| Float::new(self.precision));
        let to_radians = |x: Float| match self.angle {
            AngleUnit::Radians => x,
            AngleUnit::Degrees => x * &pi / 180,
        };
        let from_radians = |x: Float| match self.angle {
            AngleUnit::Radians => x,
            AngleUnit::Degrees => x * 180 / &pi,
        };
        let second = || b.clone().unwrap_or_else(|| Float::new(self.precision));

        match function {
            Function::Abs => a.abs(),
            Function::Acos => from_radians(a.acos()),
            Function::Asin => from_radians(a.asin()),
            Function::Atan => from_radians(a.atan()),
            Function::Ceiling => a.ceil(),
            Function::Cos => to_radians(a).cos(),
            Function::Exp => a.exp(),
            Function::Floor => a.floor(),
            Function::Ln => a.ln(),
            Function::Log => a.ln() / second().ln(),
            Function::Log10 => a.log10(),
            Function::Max => a.max(&second()),
            Function::Min => a.min(&second()),
            Function::Pow => a.pow(&second()),
            Function::Round => a.round_even(),
            Function::Sign => {
                if a.is_zero() {
                    Float::new(self.precision)
                } else {
                    a.signum()
                }
            }
            Function::Sin => to_radians(a).sin(),
            Function::Sqrt => a.sqrt(),
            Function::Tan => to_radians(a).tan(),
            Function::Truncate => a.trunc(),
        }
    }

    fn run(&self, program: Vec<Rpn>, bindings: &Bindings) -> Result<Float, EvalError> {
        let mut values: Vec<Float> = Vec::new();

        for item in program {
            trace!(?item, "applying");
            match item {
                Rpn::Number(value) => values.push(value),
                Rpn::Symbol(name) => values.push(self.resolve(&name, bindings)?),
                Rpn::Operator('n') => {
                    let operand = values.pop().ok_or(EvalError::Incomplete)?;
                    values.push(-operand);
                }
                Rpn::Operator(op) => {
                    let (Some(b), Some(a)) = (values.pop(), values.pop()) else {
                        return Err(EvalError::Incomplete);
                    };
                    values.push(self.apply_operator(op, a, b));
                }
                Rpn::Call(function, count) => {
                    if count != function.arity() {
                        return Err(EvalError::Arity {
                            name: function.name(),
                            expected: function.arity(),
                            got: count,
                        });
                    }
                    if values.len() < count {
                        return Err(EvalError::Incomplete);
                    }
                    let args = values.split_off(values.len() - count);
                    values.push(self.apply_function(function, args));
                }
            }
        }

        if values.len() != 1 {
            return Err(EvalError::Incomplete);
        }
        let result = values.pop().ok_or(EvalError::Incomplete)?;
        if !result.is_finite() {
            return Err(EvalError::NonFinite);
        }
        Ok(result)
    }
}

impl Evaluator for RugEvaluator {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<Float, EvalError> {
        let tokens = tokenize(expression)?;
        debug!(?tokens, "tokenized expression");
        let program = self.to_rpn(&tokens)?;
        debug!(?program, "reordered to postfix");
        let result = self.run(program, bindings)?;
        debug!(%result, "evaluated");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_constant_after_number() {
        let tokens = tokenize("2e").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Number("2".into(), 0), Token::Ident("e".into(), 1)]
        );
    }

    #[test]
    fn tokenize_reads_exponent() {
        let tokens = tokenize("1.5e-3*2").unwrap();
        assert_eq!(tokens[0], Token::Number("1.5e-3".into(), 0));
        assert_eq!(tokens[1], Token::Operator('*', 6));
    }

    #[test]
    fn tokenize_rejects_stray_characters() {
        assert_eq!(
            tokenize("1 # 2"),
            Err(EvalError::UnexpectedCharacter('#', 2))
        );
    }

    #[test]
    fn function_lookup_ignores_case() {
        assert_eq!(Function::lookup("SiN"), Some(Function::Sin));
        assert_eq!(Function::lookup("LOG10"), Some(Function::Log10));
        assert_eq!(Function::lookup("plot"), None);
        assert_eq!(Function::Pow.arity(), 2);
    }
}
