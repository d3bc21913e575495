//! Row models for the storage tables.

mod topic_mapping;

pub use topic_mapping::TopicMapping;
