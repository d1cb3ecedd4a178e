use std::fmt;

/// A single user question submitted for answering.
///
/// Construction goes through [`Question::parse`], so a `Question` is never
/// empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Parses raw input into a question.
    ///
    /// Returns `None` when the input is empty or contains only whitespace.
    /// The text is kept as submitted; it is not trimmed.
    pub fn parse(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    /// Returns the question text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_string() {
        assert_eq!(Question::parse(""), None);
    }

    #[test]
    fn parse_rejects_whitespace_only() {
        assert_eq!(Question::parse("  \n\t "), None);
    }

    #[test]
    fn parse_keeps_text_untrimmed() {
        let question = Question::parse(" What is my diagnosis? ").unwrap();
        assert_eq!(question.as_str(), " What is my diagnosis? ");
    }
}
