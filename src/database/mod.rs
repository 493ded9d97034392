pub mod connection;
pub mod entities;
pub mod ids;
pub mod migrations;

pub use connection::*;
pub use entities::*;
