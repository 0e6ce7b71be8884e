//! soroban-interface-core: contract interface extraction and call validation
//!
//! Recovers a structured [`ContractInterface`] from the textual interface of a
//! deployed Soroban contract, and checks proposed invocation arguments against
//! it before anything is submitted to the network.

pub mod config;
pub mod extractor;
pub mod network;
pub mod scanner;
pub mod splitter;
pub mod types;
pub mod validation;
pub mod validator;

pub use config::InterfaceConfig;
pub use extractor::{
    parse_interface, BlockError, Extraction, ExtractorOptions, InterfaceExtractor, SkippedBlock,
};
pub use network::{Network, NetworkParseError};
pub use scanner::BlockKind;
pub use splitter::{split_declarations, split_top_level};
pub use types::*;
pub use validation::{ValidationContext, ValidationDetails, ValidationError, ValidationErrorKind};
pub use validator::{
    validate_invocation, validate_request, InvocationValidator, PresenceDiff, ValidationOptions,
};
