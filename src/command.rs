//! `:` commands typed at the shell prompt.

use crate::base::Base;
use crate::session::Action;

pub const HELP: &str = "\
Type an expression and press enter. Assign with name=value.
:dec :bin :hex    switch base, converting the line typed before the command
:base N           same, with N = 2, 10 or 16
:sto :rcl :mc     store, recall and clear memory
:ans              type the last answer
:vars :clrvars    list and clear variables
:del :clear       delete one character, clear the screen
:digits N         significant digits in results
:degrees :radians angle units for trigonometry
:debug            toggle debug logging
:test             run the built-in checks
Press enter on an empty line to quit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Base(Base),
    Store,
    Recall,
    ClearMemory,
    Answer,
    Variables,
    ClearVariables,
    Delete,
    Clear,
    Digits(usize),
    Degrees,
    Radians,
    Debug,
    Test,
    Help,
}

impl Command {
    /// The engine action behind this command, if it is not a host setting.
    pub fn action(self) -> Option<Action> {
        match self {
            Command::Base(base) => Some(Action::SwitchBase(base)),
            Command::Store => Some(Action::Store),
            Command::Recall => Some(Action::Recall),
            Command::ClearMemory => Some(Action::ClearMemory),
            Command::Answer => Some(Action::RecallAnswer),
            Command::ClearVariables => Some(Action::ClearVariables),
            Command::Delete => Some(Action::Delete),
            Command::Clear => Some(Action::Clear),
            _ => None,
        }
    }
}

/// Splits an input line into the text to compose and the command after the first `:`.
pub fn split_input(line: &str) -> (&str, Option<&str>) {
    match line.find(':') {
        Some(index) => (line[..index].trim_end(), Some(&line[index + 1..])),
        None => (line, None),
    }
}

fn parse_base(arg: &str) -> Option<Base> {
    match arg.to_ascii_lowercase().as_str() {
        "2" | "bin" | "binary" => Some(Base::Binary),
        "10" | "dec" | "decimal" => Some(Base::Decimal),
        "16" | "hex" | "hexadecimal" => Some(Base::Hex),
        _ => None,
    }
}

/// Parses the text after `:`. Errors carry a message and the byte index to point at.
pub fn parse_command(input: &str) -> Result<Command, (String, usize)> {
    let start = input.len() - input.trim_start().len();
    let body = input.trim();
    let (word, rest) = match body.find(|c: char| c.is_ascii_whitespace()) {
        Some(split) => (&body[..split], &body[split..]),
        None => (body, ""),
    };
    let arg = rest.trim();
    let arg_index = start + word.len() + (rest.len() - rest.trim_start().len());

    let no_arg = |command: Command| {
        if arg.is_empty() {
            Ok(command)
        } else {
            Err(("Invalid characters after command!".to_owned(), arg_index))
        }
    };

    match word.to_ascii_lowercase().as_str() {
        "dec" => no_arg(Command::Base(Base::Decimal)),
        "bin" => no_arg(Command::Base(Base::Binary)),
        "hex" => no_arg(Command::Base(Base::Hex)),
        "base" => {
            if arg.is_empty() {
                return Err(("Missing base value!".to_owned(), arg_index));
            }
            parse_base(arg)
                .map(Command::Base)
                .ok_or_else(|| ("Base must be 2, 10 or 16!".to_owned(), arg_index))
        }
        "sto" => no_arg(Command::Store),
        "rcl" => no_arg(Command::Recall),
        "mc" => no_arg(Command::ClearMemory),
        "ans" => no_arg(Command::Answer),
        "vars" => no_arg(Command::Variables),
        "clrvars" => no_arg(Command::ClearVariables),
        "del" => no_arg(Command::Delete),
        "clear" => no_arg(Command::Clear),
        "digits" => {
            if arg.is_empty() {
                return Err(("Missing digits value!".to_owned(), arg_index));
            }
            match arg.parse::<usize>() {
                Ok(digits) if (1..=17).contains(&digits) => Ok(Command::Digits(digits)),
                _ => Err(("Digits must be between 1 and 17!".to_owned(), arg_index)),
            }
        }
        "degrees" => no_arg(Command::Degrees),
        "radians" => no_arg(Command::Radians),
        "debug" => no_arg(Command::Debug),
        "test" => no_arg(Command::Test),
        "help" => no_arg(Command::Help),
        _ => Err(("Unknown command!".to_owned(), start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_ignore_case_and_padding() {
        assert_eq!(parse_command("HeX"), Ok(Command::Base(Base::Hex)));
        assert_eq!(parse_command("  base   16 "), Ok(Command::Base(Base::Hex)));
        assert_eq!(parse_command("DIGits 9"), Ok(Command::Digits(9)));
        assert_eq!(parse_command("vars"), Ok(Command::Variables));
        assert_eq!(Command::Variables.action(), None);
    }

    #[test]
    fn errors_point_at_the_argument() {
        assert_eq!(
            parse_command("base 8"),
            Err(("Base must be 2, 10 or 16!".to_owned(), 5))
        );
        assert_eq!(
            parse_command("sto now"),
            Err(("Invalid characters after command!".to_owned(), 4))
        );
        assert_eq!(parse_command(" plot"), Err(("Unknown command!".to_owned(), 1)));
        assert_eq!(
            parse_command("digits"),
            Err(("Missing digits value!".to_owned(), 6))
        );
    }

    #[test]
    fn split_input_composes_text_before_the_command() {
        assert_eq!(split_input("255 :hex"), ("255", Some("hex")));
        assert_eq!(split_input(":bin"), ("", Some("bin")));
        assert_eq!(split_input("1+2"), ("1+2", None));
    }
}
