//! Integration tests: full fetch → merge → cache → aggregate → HTTP path
//! against a deterministic in-memory provider.

mod mock_source;
mod http_api;
