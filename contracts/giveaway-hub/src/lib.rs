pub mod contract;
pub mod draw;
pub mod error;
pub mod execute;
pub mod msg;
pub mod query;
pub mod state;
pub mod validation;

pub use crate::error::ContractError;
