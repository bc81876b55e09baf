mod auth;
mod expense;

pub use auth::{handle_login, handle_signup, me};
pub use expense::{
    create_expense, delete_expense, get_expense, list_expenses, list_expenses_by_category,
    total_amount, update_expense,
};
