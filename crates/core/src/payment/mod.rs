//! Payments and cheques.

pub mod cheque;
pub mod error;
pub mod service;
pub mod types;

pub use cheque::ChequeStatus;
pub use error::PaymentError;
pub use service::PaymentService;
pub use types::{PaymentDirection, PaymentInput, PaymentMode, Settlement};
