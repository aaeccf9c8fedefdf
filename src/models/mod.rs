pub mod category;
pub mod item;

pub use category::*;
pub use item::*;
