use std::collections::HashMap;

use axum::{
    body::{self, Body},
    extract::{FromRequestParts, Path, Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use super::auth::{AuthOperation, InputSource};
use crate::error::AppError;

/// Largest JSON body the validation layer will buffer.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Middleware enforcing an operation's constraints before the handler runs.
///
/// ```ignore
/// Router::new().route(
///     "/register",
///     post(register).route_layer(middleware::from_fn_with_state(
///         AuthOperation::Register,
///         validate,
///     )),
/// )
/// ```
///
/// Path-sourced operations (`userId`) need `route_layer` so the path
/// parameters are already matched.
pub async fn validate(
    State(operation): State<AuthOperation>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let req = match operation.source() {
        InputSource::Body => {
            let (parts, body) = req.into_parts();
            let bytes = body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read request body: {}", e))
            })?;

            let input: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
                Value::Object(Default::default())
            } else {
                serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Json parse error: {}", e))
                })?
            };

            operation.schema().validate(&input)?;
            Request::from_parts(parts, Body::from(bytes))
        }
        InputSource::Path => {
            let (mut parts, body) = req.into_parts();
            let Path(params) = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
                .await
                .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid path: {}", e)))?;

            let input = Value::Object(
                params
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            );

            operation.schema().validate(&input)?;
            Request::from_parts(parts, body)
        }
    };

    tracing::debug!(operation = %operation, "Request passed validation");

    Ok(next.run(req).await)
}
