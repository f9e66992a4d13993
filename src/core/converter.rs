use crate::core::catalog::UnitCatalog;
use crate::core::ConvertLengths;
use crate::utils::error::{ConvertError, Result};

/// Converts lengths between the units of a [`UnitCatalog`].
#[derive(Debug, Clone)]
pub struct LengthConverter {
    catalog: UnitCatalog,
}

impl LengthConverter {
    pub fn with_catalog(catalog: UnitCatalog) -> Self {
        Self { catalog }
    }

    pub fn basic() -> Self {
        Self::with_catalog(UnitCatalog::basic())
    }

    pub fn extended() -> Self {
        Self::with_catalog(UnitCatalog::extended())
    }
}

impl ConvertLengths for LengthConverter {
    fn available_units(&self) -> Vec<String> {
        self.catalog.names()
    }

    fn convert_length(&self, input_unit: &str, output_unit: &str, length: f64) -> Result<f64> {
        let from = self
            .catalog
            .get(input_unit)
            .ok_or_else(|| ConvertError::UnknownInputUnit {
                unit: input_unit.to_string(),
            })?;
        let to = self
            .catalog
            .get(output_unit)
            .ok_or_else(|| ConvertError::UnknownOutputUnit {
                unit: output_unit.to_string(),
            })?;

        Ok(from.convert_to(length, to))
    }
}
