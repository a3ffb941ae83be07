//! Request and response shapes of the v1 API. Field names are camelCase on the wire.

pub mod ask;
pub mod topics;
pub mod users;

pub use ask::{AskRequest, AskResponse};
pub use topics::{QuickRepliesQuery, QuickRepliesResponse, TopicResponse};
pub use users::{
    ClearHistoryResponse, ExchangeResponse, HistoryQuery, ProfileResponse, UpdateProfileRequest,
};
