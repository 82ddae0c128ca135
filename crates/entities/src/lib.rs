//! Data models for Teamleader records.
//!
//! Each model is a dynamically shaped attribute map bound to a shared
//! [`Connection`](teamleader_client::Connection). Network behaviour comes from
//! the capability traits in [`actions`], which a model opts into one by one.

pub mod actions;
pub mod crm;
pub mod model;

pub use actions::{Deletable, FindAll, FindById, Storable};
pub use crm::{Company, Contact};
pub use model::{Attributes, Entity};
