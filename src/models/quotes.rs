use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Quote {
            text: text.into(),
            author: author.into(),
        }
    }

    /// the plain-text form handed out by the copy button.
    pub fn copy_text(&self) -> String {
        format!("\"{}\" — {}", self.text, self.author)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticQuote {
    pub text: &'static str,
    pub author: &'static str,
}

impl StaticQuote {
    pub fn to_quote(self) -> Quote {
        Quote::new(self.text, self.author)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoodEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub quotes: &'static [StaticQuote],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_text_quotes_and_attributes() {
        let quote = Quote::new("The only way out is through.", "Robert Frost");

        assert_eq!(quote.copy_text(), "\"The only way out is through.\" — Robert Frost");
    }
}
