pub mod api;
pub mod config;
pub mod error;
pub mod handlers;
mod main_lib;

pub use main_lib::{build_state, enqueue_sample_jobs, init_tracing, start_workers, AppState};
