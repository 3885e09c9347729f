pub mod auth;
pub mod folder;
pub mod viewer;
