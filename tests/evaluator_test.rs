use basecalc_shell::{AngleUnit, Bindings, EvalError, Evaluator, RugEvaluator, SessionConfig};

fn evaluator(angle: AngleUnit) -> RugEvaluator {
    RugEvaluator::new(SessionConfig::default().precision(), angle)
}

fn eval(expression: &str) -> Result<f64, EvalError> {
    evaluator(AngleUnit::Radians)
        .evaluate(expression, &Bindings::new())
        .map(|value| value.to_f64())
}

fn assert_close(expect: f64, got: f64) {
    assert!(
        (expect - got).abs() < 1e-9,
        "expected {}, got {}",
        expect,
        got
    );
}

#[test]
fn test_precedence() {
    let cases = [
        ("2+3*4", 14.0),
        ("(2+3)*4", 20.0),
        ("2^3^2", 512.0),
        ("-2^2", -4.0),
        ("2^-1", 0.5),
        ("-2*3", -6.0),
        ("--3", 3.0),
        ("+3-1", 2.0),
        ("10-4-3", 3.0),
        ("-7%3", -1.0),
        ("7%-3", 1.0),
        ("1.5e2/3", 50.0),
    ];

    for (input, expect) in cases {
        assert_close(expect, eval(input).unwrap());
    }
}

#[test]
fn test_functions() {
    let cases = [
        ("Pow(2,10)", 1024.0),
        ("pow(2, 0.5)^2", 2.0),
        ("Sqrt(16)", 4.0),
        ("Log10(1000)", 3.0),
        ("Log(8,2)", 3.0),
        ("Ln(e)", 1.0),
        ("Exp(0)", 1.0),
        ("Max(3,Min(9,4))", 4.0),
        ("Abs(-2)", 2.0),
        ("Sign(-3)", -1.0),
        ("Sign(0)", 0.0),
        ("Round(2.5)", 2.0),
        ("Truncate(-2.7)", -2.0),
        ("Ceiling(1.2)", 2.0),
        ("Floor(-1.2)", -2.0),
        ("Sin(0)+Cos(0)", 1.0),
        ("Tan(pi/4)", 1.0),
        ("Atan(1)*4", std::f64::consts::PI),
    ];

    for (input, expect) in cases {
        assert_close(expect, eval(input).unwrap());
    }
}

#[test]
fn test_degrees() {
    let degrees = evaluator(AngleUnit::Degrees);
    let bindings = Bindings::new();

    let sin = degrees.evaluate("Sin(90)", &bindings).unwrap().to_f64();
    assert_close(1.0, sin);

    let acos = degrees.evaluate("Acos(0)", &bindings).unwrap().to_f64();
    assert_close(90.0, acos);
}

#[test]
fn test_variables_and_constants() {
    let evaluator = evaluator(AngleUnit::Radians);
    let mut bindings = Bindings::new();
    bindings.insert("x".into(), 5.0);
    bindings.insert("e".into(), 2.0);

    let value = evaluator.evaluate("x*x+e", &bindings).unwrap().to_f64();
    assert_close(27.0, value);

    let pi = evaluator.evaluate("pi", &bindings).unwrap().to_f64();
    assert_close(std::f64::consts::PI, pi);
}

#[test]
fn test_errors() {
    let cases = [
        ("", EvalError::Empty),
        ("   ", EvalError::Empty),
        ("2+*3", EvalError::ExpectedOperand(2)),
        ("2 3", EvalError::ExpectedOperator(2)),
        ("2(3)", EvalError::ExpectedOperator(1)),
        ("()", EvalError::ExpectedOperand(1)),
        ("1+", EvalError::Incomplete),
        ("(1+2", EvalError::MismatchedParentheses),
        ("1+2)", EvalError::MismatchedParentheses),
        ("1,2", EvalError::UnexpectedCharacter(',', 1)),
        ("1 # 2", EvalError::UnexpectedCharacter('#', 2)),
        ("1.2.3", EvalError::InvalidNumber("1.2.3".into())),
        ("plot(1)", EvalError::UnknownFunction("plot".into())),
        ("y+1", EvalError::UnknownSymbol("y".into())),
        (
            "Pow(2)",
            EvalError::Arity {
                name: "pow",
                expected: 2,
                got: 1,
            },
        ),
        (
            "Sin(1,2)",
            EvalError::Arity {
                name: "sin",
                expected: 1,
                got: 2,
            },
        ),
        ("1/0", EvalError::NonFinite),
        ("Sqrt(-1)", EvalError::NonFinite),
    ];

    for (input, expect) in cases {
        assert_eq!(Err(expect), eval(input), "input {:?}", input);
    }
}
