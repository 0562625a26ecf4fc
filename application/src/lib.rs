pub mod auth_service;
pub mod conversation;
pub mod file_catalog;
pub mod notice;
pub mod workspace;

#[cfg(test)]
mod testing;
