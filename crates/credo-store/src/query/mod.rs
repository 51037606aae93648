//! Repository contracts implemented by store backends.

pub mod user;

pub use user::UserRepository;
