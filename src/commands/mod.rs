pub mod build_index;
pub mod chat;
pub mod disease;
pub mod importance;
mod output;
pub mod predict;
pub mod query;
pub mod status;
pub mod symptoms;
