use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

/// Session settings. Hosts start from `Default` and adjust them with `:` commands.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Significant digits kept in the decimal result text.
    pub digits: usize,
    pub angle: AngleUnit,
    pub blink_interval: Duration,
    pub prompt: char,
    pub cursor: char,
    pub error_marker: String,
}

impl SessionConfig {
    /// Working precision in bits: enough for `digits` decimal digits plus 32 bits of padding.
    pub fn precision(&self) -> u32 {
        (self.digits as f64 * 10f64.log2()).ceil() as u32 + 32
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            digits: 12,
            angle: AngleUnit::Radians,
            blink_interval: Duration::milliseconds(500),
            prompt: '>',
            cursor: '_',
            error_marker: "what?".to_owned(),
        }
    }
}
