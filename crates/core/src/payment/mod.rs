//! Payment vouchers: cash and bank disbursements and receipts.

pub mod error;
pub mod service;
pub mod types;

pub use error::PaymentError;
pub use service::VoucherService;
pub use types::{
    FundingAccount, FundingInfo, IssueVoucherInput, ResolvedOperation, VoucherOperationInput,
    VoucherType,
};
