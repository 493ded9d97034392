pub mod integration;
pub mod notification;
pub mod payloads;
pub mod project;
pub mod team;
pub mod user;

pub use integration::*;
pub use notification::*;
pub use payloads::*;
pub use project::*;
pub use team::*;
pub use user::*;
