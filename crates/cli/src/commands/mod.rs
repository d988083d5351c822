pub mod chat;
pub mod config_cmd;
pub mod demos;
pub mod feedback;
pub mod models;
