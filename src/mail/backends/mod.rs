pub mod http;
pub mod log;
