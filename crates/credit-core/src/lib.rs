pub mod error;
pub mod stats;
pub mod store;
pub mod table;
pub mod types;

pub use error::*;
pub use store::*;
pub use table::*;
pub use types::*;
