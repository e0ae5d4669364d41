//! Delegated search: routing sentence-like queries to an external model.

pub mod openai;
pub mod provider;

pub use openai::OpenAiDelegate;
pub use provider::{
    DelegationError, DelegationRequest, DelegationResponse, SearchDelegate, MAX_DELEGATED_PICKS,
};
