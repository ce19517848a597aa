// Editable text buffer for the Paste Text mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert_char(&mut self, c: char) {
        if c != '\r' {
            self.text.push(c);
        }
    }

    /// Append pasted text, normalizing line endings.
    pub fn insert_str(&mut self, s: &str) {
        self.text.push_str(&s.replace("\r\n", "\n").replace('\r', "\n"));
    }

    pub fn newline(&mut self) {
        self.text.push('\n');
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Delete back to the previous word boundary.
    pub fn delete_word(&mut self) {
        let trimmed = self.text.trim_end_matches(char::is_whitespace).len();
        self.text.truncate(trimmed);
        let cut = self
            .text
            .rfind(char::is_whitespace)
            .map(|idx| idx + self.text[idx..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        self.text.truncate(cut);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace() {
        let mut buffer = InputBuffer::new();
        for c in "hé".chars() {
            buffer.insert_char(c);
        }
        buffer.newline();
        buffer.insert_char('x');
        buffer.backspace();
        assert_eq!(buffer.text(), "hé\n");
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let mut buffer = InputBuffer::new();
        buffer.insert_str("one\r\ntwo\rthree");
        assert_eq!(buffer.text(), "one\ntwo\nthree");
    }

    #[test]
    fn delete_word_removes_last_word() {
        let mut buffer = InputBuffer::new();
        buffer.insert_str("alpha beta  ");
        buffer.delete_word();
        assert_eq!(buffer.text(), "alpha ");
        buffer.delete_word();
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn blank_detection() {
        let mut buffer = InputBuffer::new();
        buffer.insert_str(" \n\t");
        assert!(buffer.is_blank());
        buffer.insert_char('a');
        assert!(!buffer.is_blank());
        buffer.clear();
        assert_eq!(buffer.text(), "");
    }
}
