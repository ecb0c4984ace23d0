//! Lead bounded context

pub mod entity;
pub mod repository;

pub use entity::{
    Callback, CallEvent, CallEventKind, Interest, Lead, LeadUpdate, OwnerStatus,
    DEFAULT_CALLBACK_WINDOW,
};
pub use repository::LeadRepository;
