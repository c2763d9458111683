//! Backend for the Krua Tayai restaurant website: public content API, admin
//! back office endpoints and the POS menu sync.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
