// mysite/src/auth/mod.rs

//! Sessions, capabilities and the gates handlers run before touching data.

pub mod guards;
pub mod identity;
pub mod permissions;

pub use guards::CurrentUser;
pub use identity::Identity;
pub use permissions::Permission;
