pub mod fetch;
pub mod sessions;
pub mod store;

pub use fetch::*;
pub use sessions::*;
pub use store::*;
