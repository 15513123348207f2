pub mod discord;
pub mod disk;
pub mod http;
pub mod images;
pub mod progress;

#[cfg(test)]
pub mod local_server;
