//! Business logic behind the handlers.

pub mod users;
