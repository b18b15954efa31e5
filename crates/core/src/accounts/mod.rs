//! Accounts module - Teller enrollments, Plaid tokens and the accounts they expose.

mod accounts_model;
mod accounts_traits;

pub use accounts_model::{
    Institution, NewInstitution, NewPlaidToken, PlaidAccount, PlaidToken, TellerAccount,
};
pub use accounts_traits::{
    InstitutionRepositoryTrait, PlaidAccountRepositoryTrait, PlaidTokenRepositoryTrait,
    TellerAccountRepositoryTrait,
};
