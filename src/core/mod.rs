pub mod admin;
pub mod config;
pub mod log;
pub mod progress;
pub mod provision;
pub mod roster;
pub mod scoring;
pub mod seed;
pub mod session;
pub mod team;
