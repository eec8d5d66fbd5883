mod backend;
mod generation;
mod prompt;
mod target;

pub use backend::*;
pub use generation::*;
pub use prompt::*;
pub use target::*;
