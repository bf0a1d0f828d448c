//! Human confirmation of oracle answers.

use async_trait::async_trait;
use std::io::Write;

use crate::error::{Error, Result};
use crate::memory::AttributeKind;

/// Outcome of a confirmation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmed {
    /// The proposed value, possibly edited by the operator
    Accepted(String),
    Rejected,
}

/// Synchronous human sign-off capability
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, kind: AttributeKind, key: &str, proposed: &str) -> Result<Confirmed>;
}

/// Interactive stdin confirmer. Empty input accepts the proposal, `-`
/// rejects it, anything else is taken as a corrected value.
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmation for TerminalConfirmer {
    async fn confirm(&self, kind: AttributeKind, key: &str, proposed: &str) -> Result<Confirmed> {
        let prompt = format!(
            "{} for \"{}\": [{}]\n(enter = accept, - = reject, or type a correction) > ",
            kind.label(),
            key,
            proposed
        );
        let proposed = proposed.to_string();

        tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            stdout
                .write_all(prompt.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(Error::Io)?;

            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map_err(Error::Io)?;
            let line = line.trim();

            Ok(match line {
                "" => Confirmed::Accepted(proposed),
                "-" => Confirmed::Rejected,
                edited => Confirmed::Accepted(edited.to_string()),
            })
        })
        .await
        .map_err(|e| Error::Confirmation(format!("confirmation task failed: {e}")))?
    }
}
