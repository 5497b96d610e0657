// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod logging;
pub mod notify;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;

pub use app::{App, AppState};
