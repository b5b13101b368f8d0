//! Text-to-token conversion performed before anything is sent to the server.

use std::num::ParseFloatError;

use crate::proto::{Operand, Operator, Token, token};

/// A textual token that is neither an operator nor a number.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid token '{token}': {source}")]
pub struct CodecError {
    token: String,
    #[source]
    source: ParseFloatError,
}

impl CodecError {
    /// The offending token after trimming.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Convert one textual token into its wire representation.
///
/// Surrounding whitespace is ignored. `+ - * /` map to operators; anything
/// else must parse as a 64-bit float.
///
/// # Errors
/// Returns `CodecError` when the token is not an operator and not a number.
pub fn parse_token(raw: &str) -> Result<Token, CodecError> {
    let trimmed = raw.trim();

    let kind = match trimmed {
        "+" => token::Token::Operator(Operator::Add.into()),
        "-" => token::Token::Operator(Operator::Subtract.into()),
        "*" => token::Token::Operator(Operator::Multiply.into()),
        "/" => token::Token::Operator(Operator::Divide.into()),
        _ => {
            let value = trimmed.parse::<f64>().map_err(|source| CodecError {
                token: trimmed.to_owned(),
                source,
            })?;
            token::Token::Operand(Operand { value })
        }
    };

    Ok(Token { token: Some(kind) })
}
