mod errors;
mod events;
mod tool;

pub use errors::*;
pub use events::*;
pub use tool::*;
