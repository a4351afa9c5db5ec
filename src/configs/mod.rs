pub mod base;
pub mod limits;
pub mod logging;
pub mod session;

pub use base::*;
pub use limits::*;
pub use logging::*;
pub use session::*;
