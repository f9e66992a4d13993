use crate::core::ConversionService;
use crate::utils::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const ONCE_PROMPT: &str = "Please enter length to convert: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// List units, ask for one expression, print the answer and stop.
    Once,
    /// Keep converting lines until the input ends.
    Interactive,
}

/// Operator session over any [`ConversionService`].
pub struct Session<'a, S: ConversionService + ?Sized> {
    service: &'a S,
    mode: SessionMode,
}

impl<'a, S: ConversionService + ?Sized> Session<'a, S> {
    pub fn new(service: &'a S, mode: SessionMode) -> Self {
        Self { service, mode }
    }

    /// Returns how many expressions were sent for conversion.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let units = self.service.available_units().await?.join(", ");
        tracing::debug!("Service offers units: {}", units);

        let converted = match self.mode {
            SessionMode::Once => {
                writer
                    .write_all(format!("Available units: {}\n{}", units, ONCE_PROMPT).as_bytes())
                    .await?;
                writer.flush().await?;

                match read_expression(&mut reader).await? {
                    Some(input) => {
                        let answer = self.service.convert(&input).await?;
                        writer
                            .write_all(format!("[Client] received: {}\n", answer).as_bytes())
                            .await?;
                        1
                    }
                    None => 0,
                }
            }
            SessionMode::Interactive => {
                writer
                    .write_all(
                        format!(
                            "Please enter lengths to convert in format '<length> <unit> in <unit>', using {}\n",
                            units
                        )
                        .as_bytes(),
                    )
                    .await?;
                writer.flush().await?;

                let mut count = 0;
                while let Some(input) = read_expression(&mut reader).await? {
                    if input.is_empty() {
                        continue;
                    }
                    let answer = self.service.convert(&input).await?;
                    writer.write_all(format!("{}\n", answer).as_bytes()).await?;
                    writer.flush().await?;
                    count += 1;
                }
                count
            }
        };

        writer.flush().await?;
        tracing::debug!("Session finished after {} conversion(s)", converted);
        Ok(converted)
    }
}

/// Next line without its line ending; `None` at end of input.
async fn read_expression<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
    if trimmed.trim().is_empty() {
        return Ok(Some(String::new()));
    }
    Ok(Some(trimmed))
}
