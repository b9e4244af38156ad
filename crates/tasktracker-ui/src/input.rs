use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line text field for forms. Values are appended/truncated at the
/// end; no cursor movement, matching the small forms this client has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
    masked: bool,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        Self {
            value: String::new(),
            masked: true,
        }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            masked: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Rendered form of the value; masked fields show bullets.
    pub fn display(&self) -> String {
        if self.masked {
            "\u{2022}".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Returns true when the key edited the field.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(ch);
                true
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }
}
