pub mod error;
pub mod game;
pub mod status;

pub use error::*;
pub use game::*;
pub use status::*;
