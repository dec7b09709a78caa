pub mod error;
pub mod numeric;

pub use error::AppError;
