pub mod batch;
pub mod ipu;
pub mod task;
pub mod turn;

pub use batch::*;
pub use ipu::*;
pub use task::*;
pub use turn::*;
