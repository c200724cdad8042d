// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod logging;
pub mod preferences;
pub mod question;
pub mod results;
pub mod runtime;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod ui;
