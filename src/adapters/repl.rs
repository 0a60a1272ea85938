use crate::core::desk::HelpDesk;
use crate::utils::error::{HelpDeskError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const PROMPT: &str = "You: ";
pub const FAREWELL: &str = "Bot: Goodbye!";

fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit")
}

/// Read-eval-print loop over any line source. Returns the number of questions answered.
pub async fn run<R, W>(desk: &HelpDesk, input: R, mut output: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut answered = 0;

    output
        .write_all(b"Bot: Ask me anything about the university. Type 'exit' to quit.\n")
        .await?;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        let text = match desk.answer(line).await {
            Ok(reply) => {
                answered += 1;
                reply.message()
            }
            Err(HelpDeskError::ValidationError { message }) => message,
            Err(e) => {
                tracing::error!("Failed to answer {:?}: {}", line, e);
                e.user_friendly_message()
            }
        };
        output.write_all(format!("Bot: {}\n", text).as_bytes()).await?;
    }

    output.write_all(format!("{}\n", FAREWELL).as_bytes()).await?;
    output.flush().await?;
    Ok(answered)
}
