use basecalc_shell::command::{parse_command, split_input, Command, HELP};
use basecalc_shell::{Action, AngleUnit, CalculatorSession};
use chrono::{DateTime, Utc};
use colored::*;
use rustyline::{error::ReadlineError, Config, DefaultEditor};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

type LevelHandle = reload::Handle<LevelFilter, Registry>;

fn main() -> rustyline::Result<()> {
    let (level, mut debug) = init_logging();
    let config = Config::builder().build();
    let mut rl = DefaultEditor::with_config(config)?;

    let mut session: CalculatorSession = CalculatorSession::default();
    let mut last_frame: DateTime<Utc> = Utc::now();

    let colours = RGBValues {
        echo: (0xB4, 0xB4, 0xB4),    // Light gray
        equals: (0xFF, 0xFF, 0xFF),  // White
        result: (0x78, 0xB4, 0x78),  // Soft green
        error: (0xDC, 0x64, 0x5A),   // Soft red
        carat: (0xFF, 0x14, 0x00),   // Bright red
        message: (0xB4, 0xBE, 0x3C), // Olive green
        status: (0x8C, 0x8C, 0xB4),  // Muted blue
    };

    draw(&session, &colours);
    loop {
        let current = session.buffer().current_line().to_owned();
        let prompt = format!("{}{} ", session.base().label(), session.config().prompt);
        let readline = rl.readline_with_initial(&prompt, (current.as_str(), ""));
        match readline {
            Ok(line) => {
                if line.is_empty() && current.is_empty() {
                    println!("Goodbye!");
                    break;
                }
                rl.add_history_entry(line.as_str())?;

                let now = Utc::now();
                session.dispatch(Action::Tick(now - last_frame));
                last_frame = now;

                let feedback = handle_input(&mut session, &line);
                draw(&session, &colours);
                match feedback {
                    Feedback::None => {}
                    Feedback::Message(message) => println!(
                        "{}",
                        message.truecolor(colours.message.0, colours.message.1, colours.message.2)
                    ),
                    Feedback::Error(message, pos) => {
                        // The screen was redrawn, so echo the input under the caret.
                        println!("{}{}", prompt, line);
                        println!(
                            "{}{}",
                            " ".repeat(prompt.chars().count() + pos),
                            "^".truecolor(colours.carat.0, colours.carat.1, colours.carat.2)
                        );
                        println!(
                            "{}",
                            message.truecolor(colours.error.0, colours.error.1, colours.error.2)
                        );
                    }
                    Feedback::Debug => {
                        debug = !debug;
                        let filter = if debug {
                            LevelFilter::DEBUG
                        } else {
                            LevelFilter::WARN
                        };
                        let message = match level.modify(|level| *level = filter) {
                            Ok(()) => format!("Debug {}", if debug { "enabled" } else { "disabled" }),
                            Err(err) => format!("Debug unavailable: {}", err),
                        };
                        println!(
                            "{}",
                            message.truecolor(colours.message.0, colours.message.1, colours.message.2)
                        );
                    }
                    Feedback::Test => {
                        let (passed, total) = run_tests(&colours);
                        println!("{}/{} tests passed.", passed, total);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Pressing enter with no input will exit as well.");
                break;
            }
            Err(err) => {
                println!("{:?}", err);
                break;
            }
        }
    }

    Ok(())
}

struct RGBValues {
    echo: (u8, u8, u8),
    equals: (u8, u8, u8),
    result: (u8, u8, u8),
    error: (u8, u8, u8),
    carat: (u8, u8, u8),
    message: (u8, u8, u8),
    status: (u8, u8, u8),
}

enum Feedback {
    None,
    Message(String),
    Error(String, usize),
    Debug,
    Test,
}

/// Installs the subscriber. `BASECALC_LOG` picks what is logged and turns
/// debug output on from the start; `:debug` toggles it later.
fn init_logging() -> (LevelHandle, bool) {
    let (filter, initial) = match EnvFilter::try_from_env("BASECALC_LOG") {
        Ok(filter) => (filter, LevelFilter::TRACE),
        Err(_) => (EnvFilter::new("basecalc_shell=trace"), LevelFilter::WARN),
    };
    let (level, handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(level)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
    (handle, initial != LevelFilter::WARN)
}

/// Composes the text before any `:` into the current line, then runs the
/// command, or submits the line when there is none.
fn handle_input(session: &mut CalculatorSession, line: &str) -> Feedback {
    let (text, command) = split_input(line);
    session.set_current_line(text);

    let Some(command) = command else {
        session.dispatch(Action::Submit);
        return Feedback::None;
    };
    // Point carets past the composed text and the colon.
    let offset = line.len() - command.len();

    match parse_command(command) {
        Ok(command) => {
            if let Some(action) = command.action() {
                session.dispatch(action);
                return Feedback::None;
            }
            match command {
                Command::Variables => {
                    if session.variables().is_empty() {
                        return Feedback::Message("No variables.".to_owned());
                    }
                    let listing: Vec<String> = session
                        .variables()
                        .iter()
                        .map(|(name, value)| format!("{}={}", name, value))
                        .collect();
                    Feedback::Message(listing.join("\n"))
                }
                Command::Digits(digits) => {
                    session.set_digits(digits);
                    Feedback::Message(format!("Precision set to {} digits.", digits))
                }
                Command::Degrees => {
                    session.set_angle(AngleUnit::Degrees);
                    Feedback::Message("Angle units set to degrees.".to_owned())
                }
                Command::Radians => {
                    session.set_angle(AngleUnit::Radians);
                    Feedback::Message("Angle units set to radians.".to_owned())
                }
                Command::Help => Feedback::Message(HELP.to_owned()),
                Command::Debug => Feedback::Debug,
                Command::Test => Feedback::Test,
                _ => Feedback::None,
            }
        }
        Err((message, pos)) => Feedback::Error(message, offset + pos),
    }
}

fn draw(session: &CalculatorSession, colours: &RGBValues) {
    print!("{}{}", termion::clear::All, termion::cursor::Goto(1, 1));

    let angle = match session.config().angle {
        AngleUnit::Radians => "RAD",
        AngleUnit::Degrees => "DEG",
    };
    let memory = if session.memory().is_empty() { "" } else { "RCL" };
    println!(
        "{}",
        format!("{} {} {}", angle, session.base().label(), memory).truecolor(
            colours.status.0,
            colours.status.1,
            colours.status.2
        )
    );

    // The prompt row is drawn by the line editor.
    let transcript = session.render();
    let rows: Vec<&str> = transcript.lines().collect();
    for row in &rows[..rows.len().saturating_sub(1)] {
        for coloured_string in colour_row(row, &session.config().error_marker, colours) {
            print!("{}", coloured_string);
        }
        println!();
    }
}

fn colour_row(row: &str, error_marker: &str, colours: &RGBValues) -> Vec<ColoredString> {
    let mut result = Vec::new();
    let body = row.strip_prefix(' ').unwrap_or(row);
    result.push(" ".normal());

    if body == error_marker {
        result.push(body.truecolor(colours.error.0, colours.error.1, colours.error.2));
    } else if let Some((expression, value)) = body.rsplit_once(" = ") {
        result.push(expression.truecolor(colours.echo.0, colours.echo.1, colours.echo.2));
        result.push(" = ".truecolor(colours.equals.0, colours.equals.1, colours.equals.2));
        result.push(value.truecolor(colours.result.0, colours.result.1, colours.result.2));
    } else {
        result.push(body.truecolor(colours.echo.0, colours.echo.1, colours.echo.2));
    }
    result
}

fn last_output(session: &CalculatorSession) -> String {
    let lines = session.buffer().lines();
    if lines.len() < 2 {
        return String::new();
    }
    lines[lines.len() - 2].clone()
}

fn run_tests(colours: &RGBValues) -> (usize, usize) {
    let mut session: CalculatorSession = CalculatorSession::default();

    let tests = vec![
        ("x=5", "x=5"),
        ("x=5", "x=5"),
        ("x+2", "x+2 = 7"),
        ("2+*3", "what?"),
        ("(1+2)*3", "(1+2)*3 = 9"),
        ("1/(1+1/(1+1/(1+1/2)))", "1/(1+1/(1+1/(1+1/2))) = 0.625"),
        ("Pow(2,10)", "Pow(2,10) = 1024"),
        ("Sqrt(16)*2", "Sqrt(16)*2 = 8"),
        ("Log10(1000)", "Log10(1000) = 3"),
        ("2^3^2", "2^3^2 = 512"),
        ("-2^2", "-2^2 = -4"),
        ("-7%3", "-7%3 = -1"),
        ("0.1+0.2", "0.1+0.2 = 0.3"),
        ("1/0", "what?"),
        ("y==2", "what?"),
        ("#funky(1)", "what?"),
        ("255 :hex", "ff"),
        ("0xff+1", "0xff+1 = 0x100"),
        ("0x10/4", "0x10/4 = 0x4"),
        ("1/3", "what?"),
        ("ff :bin", "11111111"),
        ("101+1", "101+1 = 110"),
        ("0-1", "0-1 = 11111111111111111111111111111111"),
        ("101 :dec", "5"),
        ("-1 :hex", "ffffffff"),
        ("ffffffff :dec", "-1"),
        (":clrvars", "variables cleared."),
        ("x", "what?"),
    ];

    let mut passed = 0;
    let total = tests.len();

    for (input, expected) in tests {
        println!("> {}", input);
        handle_input(&mut session, input);
        let result = last_output(&session);

        for coloured_string in colour_row(&result, "what?", colours) {
            print!("{}", coloured_string);
        }
        println!();

        if result == expected {
            println!("{}", "Pass!".green());
            passed += 1;
        } else {
            println!("{}", "fail!".red());
            println!("Expected: '{}'", expected);
            println!("Got     : '{}'", result);
        }

        println!();
    }

    (passed, total)
}
