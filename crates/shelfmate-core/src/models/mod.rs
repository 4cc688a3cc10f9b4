pub mod book;
pub mod category;
pub mod pool;

pub use book::*;
pub use category::*;
pub use pool::*;
