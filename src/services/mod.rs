// Services module - Business logic

pub mod pagination;
pub mod password;
pub mod search;
pub mod validation;
