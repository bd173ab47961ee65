pub mod attributes;
pub mod orgchart;
pub mod smoke;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::core::attributes::IncomingServiceAttributes;
pub use crate::core::orgchart::IncomingServiceOrgchart;
pub use crate::core::writer::WriteAttributes;
pub use crate::domain::ports::QueryApi;
pub use crate::utils::error::Result;
