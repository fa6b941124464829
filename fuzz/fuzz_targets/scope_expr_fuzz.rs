//! Fuzz test for scope predicate parsing and evaluation
//!
//! Feeds arbitrary byte sequences through the ScopeExpr pipeline to find:
//! - Panics or crashes
//! - Infinite loops
//! - Non-deterministic canonical rendering
//!
//! Run with: cargo +nightly fuzz run scope_expr_fuzz -- -max_total_time=60

#![no_main]

use ladder_core::{PartitionKey, ScopeExpr};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Try to interpret the bytes as UTF-8 JSON. Any expression that parses
    // must evaluate and render without panicking.
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(expr) = serde_json::from_str::<ScopeExpr>(input) {
            // Evaluation is total: malformed nestings evaluate to false,
            // they never panic.
            let empty = serde_json::Map::new();
            let _ = expr.matches(&empty);

            // Canonical text must be deterministic, since it feeds key
            // derivation.
            let first = expr.canonical_text();
            let second = expr.canonical_text();
            assert_eq!(first, second, "Canonical rendering should be stable");

            // Key derivation should accept any parsed expression and
            // always produce a 32-byte digest.
            let key = PartitionKey::derive("fuzz", Some(&expr));
            assert_eq!(key.to_hex().len(), 64, "Digest should be 32 bytes");
            assert_eq!(
                key,
                PartitionKey::derive("fuzz", Some(&expr)),
                "Key derivation should be deterministic"
            );

            // Round-trip through JSON preserves the expression.
            let encoded = serde_json::to_string(&expr).expect("parsed expr should re-serialize");
            let decoded: ScopeExpr =
                serde_json::from_str(&encoded).expect("re-serialized expr should parse");
            assert_eq!(expr, decoded, "JSON round-trip should be lossless");
        }
    }
});
