//! Financial documents: kinds, statuses, inputs and validation.

pub mod error;
pub mod kind;
pub mod status;
pub mod types;
pub mod validation;

pub use error::DocumentError;
pub use kind::DocumentKind;
pub use status::DocumentStatus;
pub use types::{DetailColumns, DocumentInput, KindDetails, LineItemInput};
pub use validation::{DocumentService, PreparedDocument, PreparedLine};
