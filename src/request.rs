//! JSON-RPC request envelopes

use crate::error::{BenchError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Protocol version tag sent with every request
pub const JSONRPC_VERSION: &str = "2.0";

/// Field the block number is injected into unless configured otherwise
pub const DEFAULT_BLOCK_KEY: &str = "block_number";

/// A JSON-RPC 2.0 request envelope.
///
/// Both endpoints receive the exact same envelope, so `id` is always 1:
/// every call is isolated and nothing needs correlating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub id: u64,
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Build a request. No validation of `method` or `params` happens here;
    /// a bad method surfaces as an endpoint-side error.
    pub fn build(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id: 1,
            jsonrpc: JSONRPC_VERSION,
            method: method.into(),
            params,
        }
    }
}

/// Parse a params template. Must be a JSON object; empty input means `{}`.
pub fn parse_param_template(raw: &str) -> Result<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(BenchError::InvalidParams(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(BenchError::InvalidParams(e.to_string())),
    }
}

/// Single-element params list with `block` injected at `key`.
///
/// Other template fields are carried over untouched.
pub fn block_params(template: &Map<String, Value>, key: &str, block: u64) -> Vec<Value> {
    let mut params = template.clone();
    params.insert(key.to_string(), Value::from(block));
    vec![Value::Object(params)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let req = RpcRequest::build("getBlockWithTxs", vec![json!({"block_number": 7})]);
        let wire = serde_json::to_value(&req).unwrap();
        assert_eq!(
            wire,
            json!({
                "id": 1,
                "jsonrpc": "2.0",
                "method": "getBlockWithTxs",
                "params": [{"block_number": 7}]
            })
        );
    }

    #[test]
    fn test_block_params_keeps_template_fields() {
        let template = parse_param_template(r#"{"include_receipts": true, "block_number": 1}"#).unwrap();
        let params = block_params(&template, DEFAULT_BLOCK_KEY, 2003);
        assert_eq!(params, vec![json!({"include_receipts": true, "block_number": 2003})]);
    }

    #[test]
    fn test_custom_block_key() {
        let params = block_params(&Map::new(), "height", 10);
        assert_eq!(params, vec![json!({"height": 10})]);
    }

    #[test]
    fn test_template_must_be_object() {
        assert!(parse_param_template("").unwrap().is_empty());
        assert!(matches!(
            parse_param_template("[1, 2]"),
            Err(BenchError::InvalidParams(_))
        ));
        assert!(matches!(
            parse_param_template("{not json"),
            Err(BenchError::InvalidParams(_))
        ));
    }
}
