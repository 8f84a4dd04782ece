pub mod contact;
pub mod error;
pub mod filter;
pub mod guard;
pub mod utils;
