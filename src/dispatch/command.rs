//! Parsing of `<prefix> <amount> <recipient>` transfer commands.

use std::num::ParseIntError;

/// A well-formed transfer command. The recipient is not yet checked as an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub amount: u64,
    pub recipient: String,
}

/// Why a message is not an executable command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not a command")]
    NotACommand,
    #[error("invalid format")]
    InvalidFormat,
    #[error("invalid amount")]
    InvalidAmount(#[source] ParseIntError),
}

impl Command {
    /// Parses `text` as a command introduced by `prefix`.
    ///
    /// # Errors
    /// - [`ParseError::NotACommand`] if `text` does not start with `prefix`
    /// - [`ParseError::InvalidFormat`] unless there are exactly three
    ///   whitespace-separated tokens and the first one is `prefix`
    /// - [`ParseError::InvalidAmount`] if the amount is not a non-negative integer
    pub fn parse(text: &str, prefix: &str) -> Result<Self, ParseError> {
        if !text.starts_with(prefix) {
            return Err(ParseError::NotACommand);
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [keyword, amount, recipient] = tokens.as_slice() else {
            return Err(ParseError::InvalidFormat);
        };
        if *keyword != prefix {
            return Err(ParseError::InvalidFormat);
        }

        let amount = amount.parse::<u64>().map_err(ParseError::InvalidAmount)?;

        Ok(Self {
            amount,
            recipient: recipient.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "!send";

    #[test]
    fn parses_valid_command() {
        assert_eq!(
            Command::parse("!send 5 ABC123", PREFIX),
            Ok(Command {
                amount: 5,
                recipient: "ABC123".to_string()
            })
        );
    }

    #[test]
    fn tolerates_extra_whitespace() {
        let command = Command::parse("!send   0\tABC123 ", PREFIX).unwrap();
        assert_eq!(command.amount, 0);
        assert_eq!(command.recipient, "ABC123");
    }

    #[test]
    fn non_numeric_amount_is_invalid_amount() {
        assert!(matches!(
            Command::parse("!send abc ABC123", PREFIX),
            Err(ParseError::InvalidAmount(_))
        ));
        assert!(matches!(
            Command::parse("!send -5 ABC123", PREFIX),
            Err(ParseError::InvalidAmount(_))
        ));
        assert_eq!(
            Command::parse("!send abc ABC123", PREFIX)
                .unwrap_err()
                .to_string(),
            "invalid amount"
        );
    }

    #[test]
    fn wrong_token_count_is_invalid_format() {
        assert_eq!(
            Command::parse("!send 5", PREFIX),
            Err(ParseError::InvalidFormat)
        );
        assert_eq!(
            Command::parse("!send 5 ABC123 extra", PREFIX),
            Err(ParseError::InvalidFormat)
        );
    }

    #[test]
    fn glued_prefix_is_invalid_format() {
        assert_eq!(
            Command::parse("!sendall 5 ABC123", PREFIX),
            Err(ParseError::InvalidFormat)
        );
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("hello", PREFIX), Err(ParseError::NotACommand));
        assert_eq!(
            Command::parse(" !send 5 ABC123", PREFIX),
            Err(ParseError::NotACommand)
        );
    }
}
