pub mod core;
pub mod line_server;
pub mod logging;
pub mod settings;
