// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Boolean flag codec for the store boundary.
//!
//! Listing flags (`featured`, `eyes`) are persisted as the literal strings
//! "TRUE"/"FALSE". Domain logic only ever sees `bool`; this adapter is the
//! single place the string encoding exists.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;
use serde_json::Value;

pub const TRUE: &str = "TRUE";
pub const FALSE: &str = "FALSE";

pub fn encode(value: bool) -> &'static str {
    if value {
        TRUE
    } else {
        FALSE
    }
}

/// Lenient decode: accepts the canonical literals, real booleans written by
/// older admin tooling, and treats anything else as false.
pub fn decode(value: &Value) -> bool {
    match value {
        Value::String(s) => s.eq_ignore_ascii_case(TRUE),
        Value::Bool(b) => *b,
        _ => false,
    }
}

pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(encode(*value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(decode(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_uses_canonical_literals() {
        assert_eq!(encode(true), "TRUE");
        assert_eq!(encode(false), "FALSE");
    }

    #[test]
    fn decode_is_lenient() {
        assert!(decode(&json!("TRUE")));
        assert!(decode(&json!("true")));
        assert!(decode(&json!(true)));
        assert!(!decode(&json!("FALSE")));
        assert!(!decode(&json!("yes")));
        assert!(!decode(&json!(1)));
        assert!(!decode(&Value::Null));
    }
}
