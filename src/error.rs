use thiserror::Error;

/// Everything that can go wrong while handling a submitted line.
///
/// The transcript never shows these apart: `CalculatorSession` turns every one
/// of them into the configured error marker.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvalError),

    #[error("base conversion error: {0}")]
    BaseConversion(#[from] ConversionError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("more than one '=' in assignment")]
    MultipleAssignment,

    #[error("'{0}' is not a valid variable name")]
    InvalidName(String),

    #[error("'{0}' is not a number")]
    InvalidValue(String),
}

/// Failures reported by an [`crate::Evaluator`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{0}' at {1}")]
    UnexpectedCharacter(char, usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("expected number or unary operator at {0}")]
    ExpectedOperand(usize),

    #[error("expected operator at {0}")]
    ExpectedOperator(usize),

    #[error("incomplete expression")]
    Incomplete,

    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("{name} takes {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("'{text}' is not a valid {base} literal")]
    InvalidLiteral { text: String, base: &'static str },

    #[error("'{0}' does not fit in 32 bits")]
    OutOfRange(String),

    #[error("'{0}' is not an integer")]
    NonIntegral(String),
}
