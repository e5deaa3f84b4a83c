//! Multi-base calculator shell engine.
//!
//! A [`CalculatorSession`] owns a scrollback [`LineBuffer`], the active
//! [`Base`], user variables, a memory register and the last answer. Hosts feed
//! it [`Action`]s and draw [`CalculatorSession::render`].

pub mod base;
pub mod buffer;
pub mod command;
pub mod config;
pub mod error;
pub mod expr;
pub mod keypad;
pub mod literal;
pub mod session;

pub use base::Base;
pub use buffer::LineBuffer;
pub use config::{AngleUnit, SessionConfig};
pub use error::{CalcError, ConversionError, EvalError, SyntaxError};
pub use expr::{Bindings, Evaluator, Function, RugEvaluator};
pub use keypad::Key;
pub use session::{Action, CalculatorSession, Outcome, Phase};
