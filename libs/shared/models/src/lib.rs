pub mod error;
pub mod user;

pub use error::AppError;
pub use user::User;
