// backend/src/routes/mod.rs

pub mod api;
pub mod health;
pub mod oauth;
pub mod pages;
