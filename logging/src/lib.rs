mod logging;
mod raise_error;

pub use crate::logging::Logger;
pub use crate::raise_error::{raise_error, Level};
