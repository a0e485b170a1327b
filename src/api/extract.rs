//! Request extractors whose rejections use the common JSON error body.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text responses
//! (and 422 for body errors). These wrappers route every rejection through
//! [`CareError`] so malformed input is always a 400 `ValidationError`.

use crate::core::error::CareError;
use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON body extractor and response
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CareError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameter extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CareError))]
pub struct Path<T>(pub T);

/// Query string extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(CareError))]
pub struct Query<T>(pub T);
