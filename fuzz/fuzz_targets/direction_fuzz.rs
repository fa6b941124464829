//! Fuzz test for direction parsing
//!
//! Feeds arbitrary byte sequences through Direction::from_db_str to find:
//! - Panics or crashes
//! - Accepted strings that fail to round-trip
//!
//! Run with: cargo +nightly fuzz run direction_fuzz -- -max_total_time=60

#![no_main]

use ladder_core::Direction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing should handle any valid UTF-8 string without panicking.
    if let Ok(input) = std::str::from_utf8(data) {
        match Direction::from_db_str(input) {
            Ok(direction) => {
                // Anything accepted must round-trip through its canonical
                // form and undo through its opposite.
                assert_eq!(
                    Direction::from_db_str(direction.as_db_str()),
                    Ok(direction),
                    "Canonical form should re-parse"
                );
                assert_eq!(
                    direction.opposite().opposite(),
                    direction,
                    "Opposite should be an involution"
                );
            }
            Err(err) => {
                // Rejections must carry a printable reason.
                assert!(
                    !err.to_string().is_empty(),
                    "Parse error should have a message"
                );
            }
        }
    }
});
