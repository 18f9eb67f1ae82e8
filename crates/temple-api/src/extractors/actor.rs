//! Actor extractor
//!
//! Reads the opaque `x-actor-id` header. Identity is supplied by the
//! caller and not authenticated here.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderName, HeaderValue},
};
use axum_extra::{
    headers::{self, Header},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};
use temple_common::AppError;
use temple_core::Actor;

use crate::response::ApiError;

/// Header carrying the acting staff member or system
pub static X_ACTOR_ID: HeaderName = HeaderName::from_static("x-actor-id");

/// Longest accepted actor id
const MAX_ACTOR_LEN: usize = 100;

/// Typed `x-actor-id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XActorId(pub String);

impl Header for XActorId {
    fn name() -> &'static HeaderName {
        &X_ACTOR_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let id = value
            .to_str()
            .map_err(|_| headers::Error::invalid())?
            .trim();
        if id.is_empty() || id.len() > MAX_ACTOR_LEN {
            return Err(headers::Error::invalid());
        }
        Ok(Self(id.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Actor for staff routes; the header is required
#[derive(Debug, Clone)]
pub struct StaffActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for StaffActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match TypedHeader::<XActorId>::from_request_parts(parts, state).await {
            Ok(TypedHeader(XActorId(id))) => Ok(Self(Actor::new(id))),
            Err(rejection) => match rejection.reason() {
                TypedHeaderRejectionReason::Missing => Err(AppError::MissingActor.into()),
                _ => Err(ApiError::InvalidActor),
            },
        }
    }
}

/// Actor for self-service routes; falls back to the system actor
#[derive(Debug, Clone)]
pub struct RequestActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match StaffActor::from_request_parts(parts, state).await {
            Ok(StaffActor(actor)) => Ok(Self(actor)),
            Err(ApiError::App(AppError::MissingActor)) => Ok(Self(Actor::system())),
            Err(e) => Err(e),
        }
    }
}
