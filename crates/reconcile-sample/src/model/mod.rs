pub mod application;
pub mod definition;
pub mod status;

pub use application::*;
pub use definition::*;
pub use status::*;
