pub mod ask;
pub mod topics;
pub mod users;
