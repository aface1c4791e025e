// lib.rs - Exposes the server's modules for benchmarks and integration tests.
//
// The binary entry point lives in main.rs and only starts the LSP server.

pub mod backend;
pub mod config;
pub mod handlers;
pub mod language;
pub mod locator;
pub mod occurrences;
pub mod parser_pool;
pub mod perf;
pub mod presenter;
pub mod session;
pub mod state;
pub mod utf16;
pub mod watcher;
