pub mod user;
pub mod report;

pub use user::*;
pub use report::*;
