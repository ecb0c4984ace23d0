//! Domain layer - entities, value objects, policies and ports

pub mod intent;
pub mod lead;
pub mod policy;
pub mod session;
pub mod shared;
