//! Request handlers for the authorization initiator and the callback.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::AppState;
use crate::oauth::{
    authorize_url, generate_state, validate, CallbackError, CallbackParams, CodeVerifier, Session,
    SessionId,
};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "solatran_session";

fn session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| SessionId::from_cookie(cookie.value()))
}

/// `GET /`: starts a fresh authorization flow and redirects to the provider.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(previous) = session_id(&jar) {
        state.sessions.remove(&previous).await;
    }

    let verifier = CodeVerifier::generate();
    let challenge = verifier.challenge();
    let oauth_state = generate_state();
    let url = authorize_url(&state.oauth, &oauth_state, &challenge);

    let id = SessionId::generate();
    tracing::info!("Starting authorization flow for session {:?}", id);
    state
        .sessions
        .insert(id.clone(), Session::initiated(verifier, oauth_state))
        .await;

    let cookie = Cookie::build((SESSION_COOKIE, id.as_str().to_owned()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(state.secure_cookie);

    (jar.add(cookie), Redirect::to(&url))
}

/// `GET /callback`: validates the redirect, exchanges the code and runs the dispatcher.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, CallbackError> {
    let id = session_id(&jar);
    let handle = match &id {
        Some(id) => state.sessions.get(id).await,
        None => None,
    }
    .unwrap_or_else(|| Arc::new(Mutex::new(Session::default())));

    // Held until the response is built; a concurrent callback on the same
    // session waits here and then sees the cleared session.
    let mut session = handle.lock().await;

    let validated = validate(&session, &params)?;

    // From here on the state has been spent, whatever the exchange returns
    let token = match state
        .token_client
        .exchange(&validated.code, &validated.code_verifier)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            session.clear();
            discard(&state, id.as_ref()).await;
            return Err(e.into());
        }
    };
    tracing::info!("Authorization code exchanged for session {:?}", id);

    session.used_code = Some(validated.code);
    session.access_token = Some(token.clone());

    let report = state.dispatcher.run(&token).await;

    session.clear();
    discard(&state, id.as_ref()).await;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((
        jar,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report.to_string(),
    ))
}

async fn discard(state: &AppState, id: Option<&SessionId>) {
    if let Some(id) = id {
        state.sessions.remove(id).await;
    }
}
