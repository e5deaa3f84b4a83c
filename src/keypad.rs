/// Function buttons of the on-screen keypad. Each one types a fixed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Sin,
    Cos,
    Tan,
    Pow,
    Log10,
    Sqrt,
    Invert,
    Pi,
}

impl Key {
    pub fn token(self) -> &'static str {
        match self {
            Key::Sin => "Sin(",
            Key::Cos => "Cos(",
            Key::Tan => "Tan(",
            Key::Pow => "Pow(",
            Key::Log10 => "Log10(",
            Key::Sqrt => "Sqrt(",
            Key::Invert => "1/",
            Key::Pi => "3.141593",
        }
    }
}
