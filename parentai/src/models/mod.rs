mod age;
mod chunk;
mod question;
mod session;
mod topic;

pub use age::*;
pub use chunk::*;
pub use question::*;
pub use session::*;
pub use topic::*;
