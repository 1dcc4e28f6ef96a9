//! Database access shared by Caseline services

mod init;
mod schema;

pub use init::init_database;
pub use schema::create_tables;
