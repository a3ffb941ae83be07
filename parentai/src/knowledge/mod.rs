//! Static guidance tables and the lookup fallback chain.

mod lookup;
mod table;

pub use lookup::{Guidance, LookupChain, LookupStrategy};
pub use table::{Category, KnowledgeBase, KnowledgeRecord, QuickReplyRule};
