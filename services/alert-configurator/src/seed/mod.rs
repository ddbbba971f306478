pub mod error;
pub mod loader;

pub use error::SeedError;
pub use loader::{parse_seed_csv, SeedRow};
