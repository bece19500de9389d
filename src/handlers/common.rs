use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// JSON body extractor whose rejections (bad syntax, missing fields, wrong types, missing
/// content type) use the standard error payload with a 400 status.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ServiceError::ValidationError(rejection.body_text())),
        }
    }
}

/// Query string extractor with the same 400 payload as [`JsonBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServiceError::ValidationError(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// Integer id taken from the single path parameter; anything else is a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServiceError::ValidationError(rejection.body_text()))?;

        parse_id(&raw).map(PathId)
    }
}

fn parse_id(raw: &str) -> Result<i32, ServiceError> {
    raw.parse::<i32>()
        .map_err(|_| ServiceError::invalid_field("id", format!("'{}' is not a valid id", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(
            parse_id("abc"),
            Err(ServiceError::InvalidField { ref field, .. }) if field == "id"
        ));
        assert!(parse_id("1.5").is_err());
        assert!(parse_id("99999999999").is_err());
    }
}
