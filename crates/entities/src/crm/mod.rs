//! CRM records.

pub mod company;
pub mod contact;

pub use company::Company;
pub use contact::Contact;
