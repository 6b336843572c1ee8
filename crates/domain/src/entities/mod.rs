pub mod employee;
pub mod outcome;
pub mod reference;

pub use employee::*;
pub use outcome::*;
pub use reference::*;
