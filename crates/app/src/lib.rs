//! Shared application domain and persistence modules for the SportsPro cart service.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

pub mod uuids;
