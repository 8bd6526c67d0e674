//! Repositories and the transactional engine operations.
//!
//! Each submodule exposes two layers: free functions generic over
//! `ConnectionTrait` that run inside a caller's transaction, and a
//! repository struct whose methods open exactly one transaction.

pub mod cashbank;
pub mod conversion;
pub mod document;
pub mod history;
pub mod party;
pub mod payment;
pub mod sequence;
pub mod status;
pub mod stock;

pub use cashbank::{CashBankRepository, MovementInput, NewEntry, TransferInput};
pub use conversion::{ConversionRepository, ConvertInput};
pub use document::{
    CreateDocumentInput, DocumentRepository, DocumentWithLines, InitialPayment,
    UpdateDocumentInput,
};
pub use history::HistoryRepository;
pub use party::PartyRepository;
pub use payment::PaymentRepository;
pub use sequence::SequenceRepository;
pub use status::StatusRepository;
pub use stock::{CreateProductInput, StockRepository};
