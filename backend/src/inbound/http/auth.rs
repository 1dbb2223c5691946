//! Bearer-token extractor.
//!
//! Handlers that need a caller take [`Caller`] as an argument. Extraction
//! reads `Authorization: Bearer <token>` and validates it through the
//! [`TokenValidator`](crate::domain::ports::TokenValidator) held in
//! [`HttpState`]; any failure short-circuits with `401`.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Claims, Error};

use super::state::HttpState;

const MISSING_TOKEN: &str = "authentication required";

/// Verified identity of the caller.
#[derive(Debug, Clone)]
pub struct Caller(Claims);

impl Caller {
    /// Claims decoded from the caller's token.
    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized(MISSING_TOKEN))?;
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    let (scheme, token) = raw
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(Error::unauthorized(
            "authorization header must use the Bearer scheme",
        ));
    }
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<Caller, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let token = bearer_token(req.headers())?;
    state.tokens.validate(token).map(Caller).inspect_err(|err| {
        debug!(path = req.path(), reason = err.message(), "rejected bearer token");
    })
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
