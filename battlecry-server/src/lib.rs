//! Battlecry Server
//!
//! HTTP backend for the browser-based Dart editor: compiles submitted Dart
//! source to JavaScript or a native executable, reports toolchain health,
//! and serves the editor's virtual file tree.

pub mod config;
pub mod routes;
pub mod services;
pub mod state;

pub use config::Config;
pub use state::AppState;
