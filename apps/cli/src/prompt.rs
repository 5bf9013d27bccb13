use async_trait::async_trait;
use client_core::ConfirmationGate;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// Asks on the terminal; anything but an explicit yes declines.
pub struct StdinConfirmation;

#[async_trait]
impl ConfirmationGate for StdinConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        let mut stdout = tokio::io::stdout();
        let question = format!("{prompt} [y/N] ");
        if stdout.write_all(question.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        match BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await
        {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
    }
}
