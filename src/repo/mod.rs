pub mod history;
pub mod job;
pub mod status;
pub mod user;
pub mod view;

pub use history::*;
pub use job::*;
pub use status::*;
pub use user::*;
pub use view::*;
