// Library target shared by the appliance binary, the Anki converter, the
// integration tests and the criterion benchmarks.

pub mod app;
pub mod clock;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod event;
pub mod import;
pub mod session;
pub mod store;
pub mod ui;
