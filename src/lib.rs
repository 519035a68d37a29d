pub mod ai;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod sessions;
pub mod state;
pub mod study;

#[cfg(test)]
pub mod testing;
