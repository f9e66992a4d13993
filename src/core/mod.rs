pub mod catalog;
pub mod converter;
pub mod parser;
pub mod service;

pub use crate::domain::model::{Unit, UnitDefinition};
pub use crate::domain::ports::{ConversionService, ConvertLengths};
pub use crate::utils::error::Result;
