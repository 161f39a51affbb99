#[macro_use]
extern crate anyhow;

pub mod checkout;
pub mod config;
pub mod error;
pub mod fs;
pub mod graph;
pub mod hash;
pub mod index;
pub mod lockfile;
pub mod merge;
pub mod obj;
pub mod refs;
pub mod repo;
pub mod serialize;
pub mod signature;
pub mod odb;
pub mod status;

pub use odb::ObjectStore;
pub use repo::Repository;
