pub mod forwarder;
pub mod serial;
