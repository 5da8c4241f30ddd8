//! # Credential Sharing
//!
//! Time-boxed, stateless read grants. See [`token`] for the construction.

pub mod token;

pub use token::{
    format_expiry, issue_share_token, verify_share_token, ShareRejection, ShareToken,
    ShareVerification,
};
