pub mod command_server;
pub mod event_logging;
pub mod scene;
