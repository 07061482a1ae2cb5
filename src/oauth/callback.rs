//! Callback validation: the checks that run before any code is exchanged.

use serde::Deserialize;

use super::pkce::CodeVerifier;
use super::session::Session;
use super::token::TokenError;

/// Query parameters of the redirect back from the authorization server.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Why a callback was refused.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("missing code")]
    MissingCode,
    #[error("invalid state")]
    InvalidState,
    #[error("code already used")]
    CodeAlreadyUsed,
    #[error("missing verifier")]
    MissingVerifier,
    #[error("authorization server error: {0}")]
    Upstream(#[from] TokenError),
}

/// A callback that passed validation.
#[derive(Debug)]
pub struct ValidatedCallback {
    pub code: String,
    pub code_verifier: CodeVerifier,
}

/// Runs the callback checks in order against the session.
///
/// 1. `code` present
/// 2. `state` present and equal to the stored state
/// 3. `code` not already consumed in this session
/// 4. a verifier is stored
///
/// # Errors
/// The first failing check, as the matching [`CallbackError`] variant.
pub fn validate(
    session: &Session,
    params: &CallbackParams,
) -> Result<ValidatedCallback, CallbackError> {
    let code = params
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or(CallbackError::MissingCode)?;

    match (params.state.as_deref(), session.state.as_deref()) {
        (Some(returned), Some(stored)) if returned == stored => {}
        _ => return Err(CallbackError::InvalidState),
    }

    if session.used_code.as_deref() == Some(code) {
        return Err(CallbackError::CodeAlreadyUsed);
    }

    let code_verifier = session
        .code_verifier
        .clone()
        .ok_or(CallbackError::MissingVerifier)?;

    Ok(ValidatedCallback {
        code: code.to_string(),
        code_verifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(code: Option<&str>, state: Option<&str>) -> CallbackParams {
        CallbackParams {
            code: code.map(str::to_string),
            state: state.map(str::to_string),
        }
    }

    fn initiated() -> Session {
        Session::initiated(CodeVerifier::generate(), "expected".to_string())
    }

    #[test]
    fn accepts_matching_state() {
        let session = initiated();
        let validated = validate(&session, &params(Some("code"), Some("expected"))).unwrap();
        assert_eq!(validated.code, "code");
        assert_eq!(Some(validated.code_verifier), session.code_verifier);
    }

    #[test]
    fn missing_code_is_checked_first() {
        let session = Session::default();
        assert!(matches!(
            validate(&session, &params(None, None)),
            Err(CallbackError::MissingCode)
        ));
        assert!(matches!(
            validate(&session, &params(Some(""), Some("expected"))),
            Err(CallbackError::MissingCode)
        ));
    }

    #[test]
    fn state_must_be_present_and_equal() {
        let session = initiated();
        assert!(matches!(
            validate(&session, &params(Some("code"), None)),
            Err(CallbackError::InvalidState)
        ));
        assert!(matches!(
            validate(&session, &params(Some("code"), Some("forged"))),
            Err(CallbackError::InvalidState)
        ));
    }

    #[test]
    fn cleared_session_rejects_previous_state() {
        let mut session = initiated();
        session.clear();
        assert!(matches!(
            validate(&session, &params(Some("code"), Some("expected"))),
            Err(CallbackError::InvalidState)
        ));
    }

    #[test]
    fn reused_code_is_rejected() {
        let mut session = initiated();
        session.used_code = Some("code".to_string());
        assert!(matches!(
            validate(&session, &params(Some("code"), Some("expected"))),
            Err(CallbackError::CodeAlreadyUsed)
        ));
        assert!(validate(&session, &params(Some("other"), Some("expected"))).is_ok());
    }

    #[test]
    fn missing_verifier_is_rejected_last() {
        let mut session = initiated();
        session.code_verifier = None;
        assert!(matches!(
            validate(&session, &params(Some("code"), Some("expected"))),
            Err(CallbackError::MissingVerifier)
        ));
    }
}
