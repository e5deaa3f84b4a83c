use chrono::Duration;

/// Scrollback of completed lines plus the one line being edited.
///
/// There is always at least one line and the last one is the only mutable
/// line, so `cursor_row` is always `lines.len() - 1`.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Vec<String>,
    cursor_col: usize,
    cursor_visible: bool,
    blink_accumulator: Duration,
    blink_interval: Duration,
    prompt: char,
    cursor: char,
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer::with_glyphs('>', '_', Duration::milliseconds(500))
    }

    pub fn with_glyphs(prompt: char, cursor: char, blink_interval: Duration) -> LineBuffer {
        LineBuffer {
            lines: vec![String::new()],
            cursor_col: 0,
            cursor_visible: false,
            blink_accumulator: Duration::zero(),
            blink_interval,
            prompt,
            cursor,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor_row(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.lines.len() - 1]
    }

    fn current_mut(&mut self) -> &mut String {
        let row = self.lines.len() - 1;
        &mut self.lines[row]
    }

    pub fn append_token(&mut self, text: &str) {
        self.current_mut().push_str(text);
        self.cursor_col += text.chars().count();
    }

    pub fn set_current_line(&mut self, text: &str) {
        *self.current_mut() = text.to_owned();
        self.cursor_col = text.chars().count();
    }

    /// Removes the last character. Does nothing at column 0.
    pub fn delete_one(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            self.current_mut().pop();
        }
    }

    /// Snapshot of the current line. The buffer is left as is; the caller
    /// decides what gets committed in response.
    pub fn submit_line(&self) -> String {
        self.current_line().to_owned()
    }

    /// Appends `text` as a completed line and opens a fresh current line.
    pub fn commit_result(&mut self, text: &str) {
        self.lines.push(text.to_owned());
        self.lines.push(String::new());
        self.cursor_col = 0;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.lines.push(String::new());
        self.cursor_col = 0;
    }

    /// Advances the blink timer by `elapsed`.
    pub fn tick(&mut self, elapsed: Duration) {
        self.blink_accumulator = self.blink_accumulator + elapsed;
        if self.blink_accumulator > self.blink_interval {
            self.blink_accumulator = Duration::zero();
            self.cursor_visible = !self.cursor_visible;
        }
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    /// The whole transcript: completed rows indented by one space, the current
    /// row behind the prompt, and the cursor glyph while it is visible.
    pub fn render(&self) -> String {
        let last = self.lines.len() - 1;
        let mut text = String::new();
        for line in &self.lines[..last] {
            text.push(' ');
            text.push_str(line);
            text.push('\n');
        }
        text.push(self.prompt);
        text.push_str(&self.lines[last]);
        if self.cursor_visible {
            text.push(self.cursor);
        }
        text
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        LineBuffer::new()
    }
}
