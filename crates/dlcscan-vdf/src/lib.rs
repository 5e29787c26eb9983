//! Reader and writer for Valve's brace-delimited key-value text format (VDF).
//!
//! Application manifests (`appmanifest_*.acf`), the library cross-reference
//! file (`libraryfolders.vdf`) and cached app-info dumps all use this format.

mod lexer;
mod node;
mod parser;
mod write;

pub use node::{Property, Value};
pub use parser::{parse, parse_document, ParseError};

#[cfg(any(test, feature = "fuzzing"))]
/// Entry point for the fuzz harness: parsing arbitrary bytes must never panic.
pub fn fuzz_parse(data: &[u8]) {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(root) = parse(text) {
            let written = root.to_vdf();
            let reparsed = parse(&written).expect("serialized output must parse");
            assert_eq!(reparsed, root);
        }
    }
}
