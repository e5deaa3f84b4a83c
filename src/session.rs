use crate::base::{convert, parse_decimal, Base};
use crate::buffer::LineBuffer;
use crate::config::{AngleUnit, SessionConfig};
use crate::error::{CalcError, ConversionError, EvalError, SyntaxError};
use crate::expr::{Bindings, Evaluator, RugEvaluator};
use crate::keypad::Key;
use crate::literal::rewrite;
use az::CheckedAs;
use chrono::Duration;
use rug::Float;
use std::collections::BTreeMap;
use tracing::debug;

/// Pending input that is never converted on a base switch.
const UNCONVERTED_SENTINEL: &str = "0.";

/// One UI event. Hosts queue these and apply them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Token(String),
    SetLine(String),
    Delete,
    Submit,
    Clear,
    SwitchBase(Base),
    Store,
    Recall,
    ClearMemory,
    ClearVariables,
    RecallAnswer,
    Key(Key),
    Tick(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Composing,
}

/// What an action did to the transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing was committed.
    Nothing,
    Assigned { name: String, value: String },
    Evaluated { expression: String, result: String },
    Converted(String),
    Message(String),
    Failed(CalcError),
}

/// Rounds to `digits` significant digits and prints without trailing zeros.
pub fn format_decimal(value: &Float, digits: usize) -> Result<String, EvalError> {
    let value = value.to_f64();
    let rounded = format!("{:.*e}", digits.saturating_sub(1), value)
        .parse::<f64>()
        .unwrap_or(value);
    if !rounded.is_finite() {
        return Err(EvalError::NonFinite);
    }
    // Avoid printing "-0".
    if rounded == 0.0 {
        return Ok("0".to_owned());
    }
    Ok(rounded.to_string())
}

/// Reads an unrounded result as a 32-bit integer for binary and hex display.
/// `decimal` is only used to describe a rejected value.
fn integer_result(value: &Float, decimal: &str) -> Result<i32, ConversionError> {
    let value = value.to_f64();
    if value.fract() != 0.0 {
        return Err(ConversionError::NonIntegral(decimal.to_owned()));
    }
    value
        .checked_as::<i32>()
        .ok_or_else(|| ConversionError::OutOfRange(decimal.to_owned()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// The calculator: line buffer, active base, variables and registers.
///
/// Owned by the host and driven one action at a time. Failures never escape;
/// they show up in the transcript as the configured error marker.
pub struct CalculatorSession<E = RugEvaluator> {
    config: SessionConfig,
    buffer: LineBuffer,
    base: Base,
    variables: BTreeMap<String, String>,
    memory: String,
    last_answer: String,
    pending_input: String,
    evaluator: E,
}

impl CalculatorSession<RugEvaluator> {
    pub fn new(config: SessionConfig) -> CalculatorSession<RugEvaluator> {
        let evaluator = RugEvaluator::new(config.precision(), config.angle);
        CalculatorSession::with_evaluator(config, evaluator)
    }

    pub fn set_digits(&mut self, digits: usize) {
        self.config.digits = digits;
        self.evaluator = RugEvaluator::new(self.config.precision(), self.config.angle);
    }

    pub fn set_angle(&mut self, angle: AngleUnit) {
        self.config.angle = angle;
        self.evaluator = RugEvaluator::new(self.config.precision(), self.config.angle);
    }
}

impl Default for CalculatorSession<RugEvaluator> {
    fn default() -> Self {
        CalculatorSession::new(SessionConfig::default())
    }
}

impl<E: Evaluator> CalculatorSession<E> {
    pub fn with_evaluator(config: SessionConfig, evaluator: E) -> CalculatorSession<E> {
        let buffer = LineBuffer::with_glyphs(config.prompt, config.cursor, config.blink_interval);
        CalculatorSession {
            config,
            buffer,
            base: Base::Decimal,
            variables: BTreeMap::new(),
            memory: String::new(),
            last_answer: String::new(),
            pending_input: String::new(),
            evaluator,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn base(&self) -> Base {
        self.base
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn memory(&self) -> &str {
        &self.memory
    }

    pub fn last_answer(&self) -> &str {
        &self.last_answer
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn phase(&self) -> Phase {
        if self.pending_input.is_empty() && self.buffer.current_line().is_empty() {
            Phase::Idle
        } else {
            Phase::Composing
        }
    }

    pub fn render(&self) -> String {
        self.buffer.render()
    }

    pub fn dispatch(&mut self, action: Action) -> Outcome {
        match action {
            Action::Token(text) => self.append_token(&text),
            Action::SetLine(text) => self.set_current_line(&text),
            Action::Delete => self.delete(),
            Action::Submit => return self.submit(),
            Action::Clear => self.clear(),
            Action::SwitchBase(base) => return self.switch_base(base),
            Action::Store => self.store(),
            Action::Recall => self.recall(),
            Action::ClearMemory => self.clear_memory(),
            Action::ClearVariables => return self.clear_variables(),
            Action::RecallAnswer => self.recall_answer(),
            Action::Key(key) => self.append_token(key.token()),
            Action::Tick(elapsed) => self.buffer.tick(elapsed),
        }
        Outcome::Nothing
    }

    pub fn append_token(&mut self, text: &str) {
        self.pending_input.push_str(text);
        self.buffer.append_token(text);
    }

    /// Whole-line edit, for platforms that report composed text instead of keystrokes.
    pub fn set_current_line(&mut self, text: &str) {
        self.pending_input = text.to_owned();
        self.buffer.set_current_line(text);
    }

    pub fn delete(&mut self) {
        self.buffer.delete_one();
        self.pending_input = self.buffer.current_line().to_owned();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending_input.clear();
    }

    pub fn store(&mut self) {
        self.memory = self.pending_input.clone();
        debug!(memory = %self.memory, "stored");
    }

    pub fn recall(&mut self) {
        let memory = self.memory.clone();
        self.append_token(&memory);
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    pub fn clear_variables(&mut self) -> Outcome {
        self.variables.clear();
        let message = "variables cleared.".to_owned();
        self.buffer.commit_result(&message);
        self.pending_input.clear();
        Outcome::Message(message)
    }

    /// Types the last answer as a literal of the active base. Answers that are
    /// not 32-bit integers are typed as decimal text.
    pub fn recall_answer(&mut self) {
        if self.last_answer.is_empty() {
            return;
        }
        let text = match self.base {
            Base::Decimal => self.last_answer.clone(),
            base => match parse_decimal(&self.last_answer) {
                Ok(value) => base.format_result(value),
                Err(_) => self.last_answer.clone(),
            },
        };
        self.append_token(&text);
    }

    /// Switches the active base, converting the current line from the old base.
    pub fn switch_base(&mut self, to: Base) -> Outcome {
        let from = self.base;
        self.base = to;
        debug!(%from, %to, "switched base");

        if self.pending_input == UNCONVERTED_SENTINEL {
            return Outcome::Nothing;
        }
        let line = self.buffer.submit_line();
        if line.is_empty() {
            return Outcome::Nothing;
        }

        match convert(from, to, &line) {
            Ok(Some(converted)) => {
                self.buffer.commit_result(&converted);
                self.pending_input.clear();
                Outcome::Converted(converted)
            }
            Ok(None) => Outcome::Nothing,
            Err(err) => self.fail(err.into()),
        }
    }

    /// Runs the current line as an assignment or an expression and commits the outcome.
    pub fn submit(&mut self) -> Outcome {
        let line = self.buffer.submit_line();
        if line.is_empty() {
            self.pending_input.clear();
            return Outcome::Nothing;
        }
        debug!(%line, base = %self.base, "submitted");

        let outcome = if line.contains('=') {
            match self.assign(&line) {
                Ok((name, value)) => {
                    self.buffer.commit_result(&format!("{}={}", name, value));
                    Outcome::Assigned { name, value }
                }
                Err(err) => self.fail(err),
            }
        } else {
            match self.calculate(&line) {
                Ok((decimal, display)) => {
                    self.last_answer = decimal;
                    self.buffer.commit_result(&format!("{} = {}", line, display));
                    Outcome::Evaluated {
                        expression: line,
                        result: display,
                    }
                }
                Err(err) => self.fail(err),
            }
        };

        self.pending_input.clear();
        outcome
    }

    fn fail(&mut self, err: CalcError) -> Outcome {
        debug!(%err, "rejected input");
        let marker = self.config.error_marker.clone();
        self.buffer.commit_result(&marker);
        self.pending_input.clear();
        Outcome::Failed(err)
    }

    fn assign(&mut self, line: &str) -> Result<(String, String), CalcError> {
        let mut parts = line.split('=');
        let name = parts.next().unwrap_or_default().trim();
        let value = parts.next().unwrap_or_default().trim();
        if parts.next().is_some() {
            return Err(SyntaxError::MultipleAssignment.into());
        }
        if !is_identifier(name) {
            return Err(SyntaxError::InvalidName(name.to_owned()).into());
        }
        if value.parse::<f64>().is_err() {
            return Err(SyntaxError::InvalidValue(value.to_owned()).into());
        }

        self.variables.insert(name.to_owned(), value.to_owned());
        debug!(name, value, "assigned");
        Ok((name.to_owned(), value.to_owned()))
    }

    fn bindings(&self) -> Result<Bindings, CalcError> {
        let mut bindings = Bindings::new();
        for (name, value) in &self.variables {
            let parsed = value
                .parse::<f64>()
                .map_err(|_| SyntaxError::InvalidValue(value.clone()))?;
            bindings.insert(name.clone(), parsed);
        }
        Ok(bindings)
    }

    /// Returns the decimal result and its display form in the active base.
    /// Touches no state.
    fn calculate(&self, line: &str) -> Result<(String, String), CalcError> {
        let expression = rewrite(line, self.base)?;
        debug!(%expression, "rewrote literals");

        let bindings = self.bindings()?;
        let value = self.evaluator.evaluate(&expression, &bindings)?;
        let rounded = format_decimal(&value, self.config.digits)?;

        // Integer bases ignore the digits setting.
        let (decimal, displayed) = match self.base {
            Base::Decimal => (rounded.clone(), rounded),
            base => {
                let integer = integer_result(&value, &rounded)?;
                (integer.to_string(), base.format_result(integer))
            }
        };
        debug!(%decimal, display = %displayed, "formatted result");
        Ok((decimal, displayed))
    }
}
