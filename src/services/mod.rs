pub mod authz;
mod store;
mod token;

pub use store::{ExpenseFilter, StoreService};
pub use token::{Claims, ConfigError, TokenError, TokenService};
