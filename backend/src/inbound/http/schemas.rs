//! OpenAPI schemas for domain error types.
//!
//! The domain error stays free of utoipa derives; these mirrors document the
//! wire shape instead.

use utoipa::ToSchema;

/// Machine-readable error codes.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Malformed input or a failed validation rule.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The addressed resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Insufficient stock, lock timeout or a duplicate unique key.
    #[schema(rename = "conflict")]
    Conflict,
    /// The store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error payload returned by every endpoint.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(dead_code, reason = "only used for OpenAPI generation")]
pub struct ErrorSchema {
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    #[schema(example = "insufficient stock for product 3: 1 available, 2 requested")]
    message: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Structured context such as `{"code": "insufficient_stock"}`.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises")
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let json = schema_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(json.contains(code), "missing {code}");
        }
        assert!(!json.contains("unauthorized"));
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let json = schema_json::<ErrorSchema>();
        assert!(json.contains("traceId"));
        assert!(json.contains("details"));
    }
}
