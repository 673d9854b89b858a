pub mod data;
pub mod errors;
pub mod params;
pub mod traits;

pub use data::*;
pub use errors::*;
pub use params::*;
pub use traits::*;
