//! SQLite storage implementation for Teller accounts.

mod model;
mod repository;

pub use model::TellerAccountDB;
pub use repository::TellerAccountRepository;
