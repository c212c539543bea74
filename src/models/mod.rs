pub mod corpus;
pub mod evidence;
pub mod incident;

pub use corpus::*;
pub use evidence::*;
pub use incident::*;
