//! Helpers for the JSON fragments modules return from [`Module::openapi`].
//!
//! Fragments use plain OpenAPI 3.0 JSON; the HTTP layer prefixes their paths
//! with `/api/{module}` and merges the schemas.
//!
//! [`Module::openapi`]: crate::Module::openapi

use serde_json::{json, Map, Value};

/// `$ref` to a schema in `#/components/schemas`.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// Array of `$ref` items.
pub fn array_of(name: &str) -> Value {
    json!({ "type": "array", "items": schema_ref(name) })
}

/// A JSON response with the given schema.
pub fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

/// A response using the shared error envelope.
pub fn error_response(description: &str) -> Value {
    json_response(description, schema_ref("ErrorResponse"))
}

/// Builds one operation.
///
/// `responses` pairs status codes with response objects; a `502` upstream
/// error is added to every operation since each one talks to the backend.
pub fn operation(tag: &str, summary: &str, responses: Vec<(&str, Value)>) -> Value {
    let mut map = Map::new();
    for (status, response) in responses {
        map.insert(status.to_string(), response);
    }
    map.entry("502")
        .or_insert_with(|| error_response("Backend unavailable or failed"));

    json!({
        "summary": summary,
        "tags": [tag],
        "responses": Value::Object(map)
    })
}

/// Same as [`operation`] with a JSON request body and the bearer requirement.
pub fn authed_operation(
    tag: &str,
    summary: &str,
    body: Option<Value>,
    responses: Vec<(&str, Value)>,
) -> Value {
    let mut op = operation(tag, summary, responses);
    op["security"] = json!([{ "bearerAuth": [] }]);
    op["responses"]["401"] = error_response("Missing or invalid session");
    if let Some(schema) = body {
        op["requestBody"] = request_body(schema);
    }
    op
}

pub fn request_body(schema: Value) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema } }
    })
}

/// Object schema with every listed property required.
pub fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}
