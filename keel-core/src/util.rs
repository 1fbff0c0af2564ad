use std::fmt::{self, Display};

const TRUNCATE_AT: usize = 497;

/// Display adapter that shortens long text (SQL, raw column values) in messages.
pub struct Truncated<'a>(pub &'a str);

impl Display for Truncated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.0;
        if text.len() <= TRUNCATE_AT {
            return f.write_str(text);
        }
        let mut end = TRUNCATE_AT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        write!(f, "{}...", text[..end].trim_end())
    }
}

#[macro_export]
macro_rules! truncate_long {
    ($text:expr) => {
        $crate::Truncated(&$text)
    };
}

pub fn consume_while<'s>(input: &mut &'s str, predicate: impl FnMut(&char) -> bool) -> &'s str {
    let len = input
        .chars()
        .take_while(predicate)
        .map(char::len_utf8)
        .sum::<usize>();
    if len == 0 {
        return "";
    }
    let result = &input[..len];
    *input = &input[len..];
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_while_stops_at_predicate() {
        let mut input = "user_id = 1";
        let name = consume_while(&mut input, |c| c.is_alphanumeric() || *c == '_');
        assert_eq!(name, "user_id");
        assert_eq!(input, " = 1");
        assert_eq!(consume_while(&mut input, char::is_ascii_digit), "");
        assert_eq!(input, " = 1");
    }

    #[test]
    fn consume_while_multibyte() {
        let mut input = "città:x";
        assert_eq!(consume_while(&mut input, |c| c.is_alphabetic()), "città");
        assert_eq!(input, ":x");
    }

    #[test]
    fn truncated_long_text() {
        let short = "select 1";
        assert_eq!(truncate_long!(short).to_string(), "select 1");
        let long = "é".repeat(400);
        let result = truncate_long!(long).to_string();
        assert!(result.ends_with("..."));
        assert!(result.len() <= TRUNCATE_AT + 3);
    }
}
