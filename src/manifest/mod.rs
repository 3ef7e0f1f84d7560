//! Manifest data model, parser, and response validator.

mod model;
mod parser;
mod response_validator;

pub use model::{ArgType, Argument, ErrorCodeSpec, Manifest, Model, RequestSpec, ResponseDefinition};
pub use parser::{ManifestParser, RESERVED_REQUESTS};
pub use response_validator::{ResponseValidator, ValidationError, ValidationResult};
