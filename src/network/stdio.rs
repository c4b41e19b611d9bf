//! Line-Stream Transport
//!
//! One JSON request per input line, one JSON response per output line.
//! Messages are handled strictly in arrival order, one at a time.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::network::adapter::CommitRevealAdapter;
use crate::network::protocol::BotResponse;
use crate::network::transport::TransportError;

/// Counters for a finished stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Non-blank lines handled.
    pub messages: u64,
    /// Lines answered with an error payload.
    pub errors: u64,
}

/// Serve the protocol over a line stream until the reader hits EOF.
///
/// Blank lines are skipped. Every other line gets exactly one response line,
/// flushed before the next line is read.
pub async fn run_line_stream<R, W>(
    adapter: &CommitRevealAdapter,
    mut reader: R,
    mut writer: W,
) -> Result<StreamStats, TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut stats = StreamStats::default();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        // A line that is not UTF-8 is a malformed message, not a broken stream.
        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                adapter.handle_json(line)
            }
            Err(_) => BotResponse::not_utf8(),
        };

        stats.messages += 1;
        if matches!(response, BotResponse::Error(_)) {
            stats.errors += 1;
        }

        let mut text = response.to_json()?;
        text.push('\n');
        writer.write_all(text.as_bytes()).await?;
        writer.flush().await?;
    }

    debug!(messages = stats.messages, errors = stats.errors, "line stream closed");
    Ok(stats)
}

/// Serve the protocol on process stdin/stdout.
///
/// Logs must not go to stdout while this runs.
pub async fn run_stdio(adapter: &CommitRevealAdapter) -> Result<StreamStats, TransportError> {
    info!("Serving commit/reveal on stdin/stdout");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_line_stream(adapter, stdin, stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Action;
    use crate::game::bot::{Bot, BotError};
    use crate::game::observation::Observation;
    use crate::game::strategy::Strategy;
    use crate::network::protocol::ErrorCode;
    use crate::proof::commitment::verify_reveal;
    use std::sync::Arc;

    fn adapter_with(bot: Arc<dyn Bot>) -> CommitRevealAdapter {
        CommitRevealAdapter::with_bot(bot)
    }

    async fn run(adapter: &CommitRevealAdapter, input: &str) -> (StreamStats, Vec<BotResponse>) {
        let mut output = Vec::new();
        let stats = run_line_stream(adapter, input.as_bytes(), &mut output).await.unwrap();
        let text = String::from_utf8(output).unwrap();
        let responses = text.lines().map(|l| BotResponse::from_json(l).unwrap()).collect();
        (stats, responses)
    }

    #[tokio::test]
    async fn test_commit_reveal_over_stream() {
        let bot: Arc<dyn Bot> = Arc::new(|_: &Observation| -> Result<Vec<Action>, BotError> {
            Ok(vec![
                Action::SendFleet { from_id: 1, to_id: 2, energy: 5.0 },
                Action::Scan { x: 0.5, y: 0.5, radius: 0.25 },
            ])
        });
        let adapter = adapter_with(bot);

        let input = "{\"type\":\"commit\",\"tick\":7,\"observation\":{}}\n{\"type\":\"reveal\",\"tick\":7}\n";
        let (stats, responses) = run(&adapter, input).await;

        assert_eq!(stats, StreamStats { messages: 2, errors: 0 });
        let BotResponse::Commit(committed) = &responses[0] else {
            panic!("Wrong response type");
        };
        let BotResponse::Reveal(revealed) = &responses[1] else {
            panic!("Wrong response type");
        };
        assert_eq!(committed.tick, 7);
        assert_eq!(revealed.tick, 7);
        assert_eq!(revealed.actions.len(), 2);
        assert!(verify_reveal(&committed.commit, &revealed.actions, &revealed.nonce).is_ok());
    }

    #[tokio::test]
    async fn test_commit_line_discloses_no_actions() {
        let adapter = adapter_with(Arc::new(Strategy::Turtle));
        let mut output = Vec::new();
        let input = r#"{"type":"commit","tick":1,"observation":{"player_id":1,"planets":[{"id":4,"owner":1}]}}"#;
        run_line_stream(&adapter, input.as_bytes(), &mut output).await.unwrap();

        let line = String::from_utf8(output).unwrap();
        assert!(line.ends_with('\n'));
        assert!(!line.contains("actions"));
        assert!(!line.contains("upgrade"));
        assert!(adapter.store().contains(1));
    }

    #[tokio::test]
    async fn test_blank_lines_skipped() {
        let adapter = adapter_with(Arc::new(Strategy::Expansion));
        let (stats, responses) = run(&adapter, "\n   \n{\"type\":\"reveal\",\"tick\":2}\n\n").await;
        assert_eq!(stats.messages, 1);
        assert_eq!(responses.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_line_does_not_stop_stream() {
        let adapter = adapter_with(Arc::new(Strategy::Expansion));
        let input = "{oops\n{\"type\":\"ping\"}\n{\"type\":\"reveal\",\"tick\":3}\n";
        let (stats, responses) = run(&adapter, input).await;

        assert_eq!(stats, StreamStats { messages: 3, errors: 2 });
        assert!(matches!(&responses[0], BotResponse::Error(e) if e.error == ErrorCode::InvalidJson));
        assert!(matches!(&responses[1], BotResponse::Error(e) if e.error == ErrorCode::UnknownPhase));
        assert!(matches!(&responses[2], BotResponse::Reveal(r) if r.actions.is_empty() && r.nonce.is_empty()));
    }

    #[tokio::test]
    async fn test_non_utf8_line_does_not_stop_stream() {
        let adapter = adapter_with(Arc::new(Strategy::Expansion));
        let mut input = b"{\"type\":\"reveal\",\"tick\":1}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"type\":\"reveal\",\"tick\":2}\n");

        let mut output = Vec::new();
        let stats = run_line_stream(&adapter, input.as_slice(), &mut output).await.unwrap();
        let responses: Vec<BotResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| BotResponse::from_json(l).unwrap())
            .collect();

        assert_eq!(stats, StreamStats { messages: 3, errors: 1 });
        assert_eq!(responses.len(), 3);
        assert!(matches!(&responses[1], BotResponse::Error(e) if e.error == ErrorCode::InvalidJson));
        assert!(matches!(&responses[2], BotResponse::Reveal(r) if r.tick == 2));
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let adapter = adapter_with(Arc::new(Strategy::Expansion));
        let (stats, responses) = run(&adapter, "{\"type\":\"reveal\",\"tick\":6}").await;
        assert_eq!(stats.messages, 1);
        assert!(matches!(&responses[0], BotResponse::Reveal(r) if r.tick == 6));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let adapter = adapter_with(Arc::new(Strategy::Rush));
        let (stats, responses) = run(&adapter, "").await;
        assert_eq!(stats, StreamStats::default());
        assert!(responses.is_empty());
    }
}
