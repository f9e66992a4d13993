use crate::core::ConvertLengths;
use crate::utils::error::ConvertError;
use thiserror::Error;

pub const CORRECT_FORMAT: &str = "Please use format '<length> <unit> in <unit>'";

/// Why a `<length> <unit> in <unit>` expression could not be read.
/// The `Display` text is the line shown to the operator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("{}", CORRECT_FORMAT)]
    WrongArity { count: usize },

    #[error("Incorrect command, expected 'in'. {}", CORRECT_FORMAT)]
    ExpectedIn { found: String },

    #[error("'{token}' is not a valid number. {}", CORRECT_FORMAT)]
    InvalidNumber { token: String },
}

/// A parsed `<length> <unit> in <unit>` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthQuery {
    pub length: f64,
    pub input_unit: String,
    pub output_unit: String,
}

impl LengthQuery {
    pub fn new(length: f64, input_unit: impl Into<String>, output_unit: impl Into<String>) -> Self {
        Self {
            length,
            input_unit: input_unit.into(),
            output_unit: output_unit.into(),
        }
    }

    /// 檢查順序: 參數數量、'in' 關鍵字、數字
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, QueryError> {
        let [length, input_unit, keyword, output_unit] = args else {
            return Err(QueryError::WrongArity { count: args.len() });
        };

        if keyword.as_ref() != "in" {
            return Err(QueryError::ExpectedIn {
                found: keyword.as_ref().to_string(),
            });
        }

        let length = parse_length(length.as_ref())?;

        Ok(Self::new(length, input_unit.as_ref(), output_unit.as_ref()))
    }

    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let args: Vec<&str> = input.split_whitespace().collect();
        Self::from_args(&args)
    }
}

fn parse_length(token: &str) -> Result<f64, QueryError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(QueryError::InvalidNumber {
            token: token.to_string(),
        }),
    }
}

/// Formats a length with at most 15 significant digits and no trailing zeros,
/// so `12 in` in feet reads `1` rather than `0.9999999999999999`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let rounded = format!("{:.14e}", value)
        .parse::<f64>()
        .unwrap_or(value);
    format!("{}", rounded)
}

/// Turns operator input into the single answer line the operator sees.
/// Every outcome, including bad input, is a line of text.
pub struct InputParser<'a> {
    converter: &'a dyn ConvertLengths,
}

impl<'a> InputParser<'a> {
    pub fn new(converter: &'a dyn ConvertLengths) -> Self {
        Self { converter }
    }

    pub fn convert_input(&self, input: &str) -> String {
        let args: Vec<&str> = input.split_whitespace().collect();
        self.convert_args(&args)
    }

    pub fn convert_args<S: AsRef<str>>(&self, args: &[S]) -> String {
        match LengthQuery::from_args(args) {
            Ok(query) => self.answer(&query),
            Err(e) => {
                tracing::debug!("Rejected input {:?}: {:?}", args.iter().map(|a| a.as_ref()).collect::<Vec<_>>(), e);
                e.to_string()
            }
        }
    }

    pub fn answer(&self, query: &LengthQuery) -> String {
        match self
            .converter
            .convert_length(&query.input_unit, &query.output_unit, query.length)
        {
            Ok(converted) => format!(
                "{} {} equals {} {}",
                format_number(query.length),
                query.input_unit,
                format_number(converted),
                query.output_unit
            ),
            Err(ConvertError::UnknownInputUnit { unit })
            | Err(ConvertError::UnknownOutputUnit { unit }) => self.incorrect_unit_message(&unit),
            Err(e) => {
                tracing::warn!("Conversion failed unexpectedly: {}", e);
                CORRECT_FORMAT.to_string()
            }
        }
    }

    fn incorrect_unit_message(&self, unit: &str) -> String {
        let available = self
            .converter
            .available_units()
            .iter()
            .map(|u| format!("'{}'", u))
            .collect::<Vec<_>>()
            .join(", ");
        format!("'{}' is not a valid unit. Available units are {}", unit, available)
    }
}
