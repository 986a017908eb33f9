// Core data models for jobdesk
// These structs represent the domain entities

pub mod job;
pub mod status;
pub mod user;

pub use job::*;
pub use status::*;
pub use user::*;
