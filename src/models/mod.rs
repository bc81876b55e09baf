mod expense;
mod forms;
mod member;

pub use expense::{Category, Expense, Photo, SavedPhoto};
pub use forms::{
    AmountDto, ExpenseForm, ExpenseResponse, LoginForm, LoginResponse, MemberResponse,
    PageParams, PageResponse, RegisterForm,
};
pub use member::{Member, Principal, RoleType};
