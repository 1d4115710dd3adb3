mod catalog;
mod clips;
mod datasets;
pub mod db;
pub mod models;
mod raw;
mod tables;

pub use db::{Database, StoreError};
pub use tables::*;
