use crate::core::parser::InputParser;
use crate::core::{ConversionService, ConvertLengths};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// In-process [`ConversionService`]: runs the parser directly over a converter.
#[derive(Clone)]
pub struct LocalService {
    converter: Arc<dyn ConvertLengths>,
}

impl LocalService {
    pub fn new(converter: Arc<dyn ConvertLengths>) -> Self {
        Self { converter }
    }
}

#[async_trait]
impl ConversionService for LocalService {
    async fn available_units(&self) -> Result<Vec<String>> {
        Ok(self.converter.available_units())
    }

    async fn convert(&self, input: &str) -> Result<String> {
        Ok(InputParser::new(self.converter.as_ref()).convert_input(input))
    }
}
