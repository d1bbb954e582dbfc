//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::response::ApiError;

/// Site identifier from the `/sites/:site_id/...` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteId(pub u32);

#[async_trait]
impl<S> FromRequestParts<S> for SiteId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(site_id) = Path::<u32>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("siteId must be a positive integer"))?;

        if site_id == 0 {
            return Err(ApiError::bad_request("siteId must be a positive integer"));
        }

        Ok(SiteId(site_id))
    }
}

/// Query string deserialized into `T` and checked with `validator`.
///
/// Unknown parameters are ignored, so several `ValidatedQuery` extractors
/// can read different parts of the same query string.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::validation(flatten_errors(&errors)))?;

        Ok(ValidatedQuery(value))
    }
}

/// One line per failed field rule, sorted for stable output.
fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |e| format!("{}: {}", field, e.code))
        })
        .collect();
    lines.sort();
    lines
}
