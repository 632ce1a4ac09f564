pub mod bar;
pub mod range;
pub mod response;

pub use bar::*;
pub use range::*;
pub use response::*;
