//! Integration tests: full sessions replayed through the public API.

mod api;
mod replay;
