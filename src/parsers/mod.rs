pub mod phrases;
pub mod tasks;
pub mod turns;
pub mod words;

pub use phrases::*;
pub use tasks::*;
pub use turns::*;
pub use words::*;
