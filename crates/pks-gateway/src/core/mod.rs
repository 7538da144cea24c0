//! Core logic for the PKS gateway

pub mod registration;
mod uniqueness;

pub use registration::{EndpointRegistrar, RegistrationOutcome};
pub use uniqueness::UniquenessChecker;
