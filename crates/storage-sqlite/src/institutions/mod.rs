//! SQLite storage implementation for Teller institutions.

mod model;
mod repository;

pub use model::InstitutionDB;
pub use repository::InstitutionRepository;
