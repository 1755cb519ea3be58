pub mod chunk;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod import;
pub mod migrate;
pub mod model;
pub mod notion;
pub mod save;
pub mod trello;
