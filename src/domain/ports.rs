use crate::utils::error::Result;
use async_trait::async_trait;

/// Something that knows a set of units and converts lengths between them.
pub trait ConvertLengths: Send + Sync {
    fn available_units(&self) -> Vec<String>;

    /// Converts `length` from `input_unit` to `output_unit`.
    ///
    /// The input unit is checked first: when both are unknown the error names
    /// the input unit.
    fn convert_length(&self, input_unit: &str, output_unit: &str, length: f64) -> Result<f64>;
}

/// The two operations an operator session needs, whether the converter runs
/// in this process or behind the RPC service.
#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn available_units(&self) -> Result<Vec<String>>;

    /// Takes a raw `<length> <unit> in <unit>` line and returns the answer line.
    async fn convert(&self, input: &str) -> Result<String>;
}
