//! Flow file input.
//!
//! Each input file is loaded whole into a `FlowDocument` before its flows
//! are filtered. Gzip-compressed files (by `.gz` suffix or magic bytes) are
//! decompressed on the fly.

mod source;

pub use source::{is_gzip_extension, AppFlow, FlowDocument, FlowSource, JsonFileSource};
