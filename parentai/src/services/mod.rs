mod assistant;

pub use assistant::ParentingAssistant;
