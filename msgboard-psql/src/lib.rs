#[macro_use]
extern crate tracing;

pub use self::database::{Database, DatabaseConfig};

mod database;
mod impls;

pub mod model;
