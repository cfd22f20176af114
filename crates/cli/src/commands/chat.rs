//! Chat command handler.
//!
//! Runs the interactive question loop: read a line, retrieve, answer, print.
//! Backend failures are printed as answers and never end the session.

use super::build_pipeline;
use clap::Args;
use kbqa_core::{config::AppConfig, AppResult};
use kbqa_knowledge::RagPipeline;
use std::future::Future;
use std::io::{self, Write};
use tokio::sync::mpsc;

/// Start an interactive question session
#[derive(Args, Debug, Default)]
pub struct ChatCommand {
    /// Print the retrieved passage ids and scores after each answer
    #[arg(long)]
    pub show_sources: bool,
}

/// One line of session input, classified.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionInput<'a> {
    /// End of input or interrupt
    End,
    /// `exit` or `quit`
    Exit,
    Blank,
    Question(&'a str),
}

/// Whether the trimmed input is one of the reserved exit words.
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Classify a line read from the console; `None` means no more input.
pub fn parse_input(line: Option<&str>) -> SessionInput<'_> {
    match line.map(str::trim) {
        None => SessionInput::End,
        Some(input) if is_exit_command(input) => SessionInput::Exit,
        Some("") => SessionInput::Blank,
        Some(input) => SessionInput::Question(input),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let pipeline = build_pipeline(config)?;
        let lines = spawn_stdin_reader();
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        run_session(&pipeline, lines, interrupt, std::io::stdout(), self.show_sources).await
    }
}

/// Read stdin line by line on a dedicated thread.
///
/// A blocking console read cannot be cancelled. Keeping it off the runtime
/// lets the process exit on interrupt while the read is still pending.
fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);

    std::thread::spawn(move || {
        for line in io::stdin().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    rx
}

/// Drive the question loop until end of input, `interrupt` resolving or an
/// exit word.
///
/// An interrupt that fires while an answer is being generated ends the
/// session at the next prompt.
pub async fn run_session<F, W>(
    pipeline: &RagPipeline,
    mut lines: mpsc::Receiver<io::Result<String>>,
    interrupt: F,
    mut out: W,
    show_sources: bool,
) -> AppResult<()>
where
    F: Future<Output = ()>,
    W: Write,
{
    tokio::pin!(interrupt);

    writeln!(
        out,
        "Welcome! Ask about {}. (Type 'exit' or 'quit' to end.)",
        pipeline.generator().domain()
    )?;

    loop {
        write!(out, "\nYour question: ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.recv() => line.transpose()?,
            _ = &mut interrupt => {
                tracing::debug!("Session interrupted");
                None
            }
        };

        let query = match parse_input(line.as_deref()) {
            SessionInput::End => {
                writeln!(out, "\nExiting.")?;
                break;
            }
            SessionInput::Exit => {
                writeln!(out, "Exiting program.")?;
                break;
            }
            SessionInput::Blank => continue,
            SessionInput::Question(query) => query,
        };

        let turn = pipeline.respond(query).await;
        writeln!(out, "\nAI answer: {}\n", turn.answer)?;

        if show_sources {
            for source in turn.sources() {
                writeln!(out, "  - {} (score {:.4})", source.id, source.score)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_pipeline;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Channel preloaded with `input`, closed at the end like a finished stdin.
    fn lines_of(input: &str) -> mpsc::Receiver<io::Result<String>> {
        let lines: Vec<&str> = input.lines().collect();
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            tx.try_send(Ok(line.to_string())).unwrap();
        }
        rx
    }

    async fn run(pipeline: &RagPipeline, input: &str, show_sources: bool) -> String {
        let mut out = Vec::new();
        run_session(
            pipeline,
            lines_of(input),
            std::future::pending(),
            &mut out,
            show_sources,
        )
        .await
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input(None), SessionInput::End);
        assert_eq!(parse_input(Some("  EXIT ")), SessionInput::Exit);
        assert_eq!(parse_input(Some("Quit")), SessionInput::Exit);
        assert_eq!(parse_input(Some("   ")), SessionInput::Blank);
        assert_eq!(
            parse_input(Some(" Are there fees? ")),
            SessionInput::Question("Are there fees?")
        );
        assert!(!is_exit_command("exit now"));
    }

    #[tokio::test]
    async fn test_exit_before_any_backend_call() {
        let server = MockServer::start().await;
        let pipeline = test_pipeline(&format!("{}/api/chat", server.uri()));

        let output = run(&pipeline, "quit\nAre there tuition fees?\n", false).await;

        assert!(output.starts_with("Welcome! Ask about the M.Sc. Information Technology program at TH OWL."));
        assert!(output.contains("Exiting program."));
        assert!(!output.contains("AI answer"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let pipeline = test_pipeline("http://127.0.0.1:9/api/chat");
        let output = run(&pipeline, "", false).await;
        assert!(output.ends_with("\nExiting.\n"));
    }

    #[tokio::test]
    async fn test_interrupt_while_waiting_for_input() {
        let server = MockServer::start().await;
        let pipeline = test_pipeline(&format!("{}/api/chat", server.uri()));

        // The sender stays open, so no line ever arrives.
        let (_tx, rx) = mpsc::channel(1);
        let interrupt = tokio::time::sleep(Duration::from_millis(50));
        let mut out = Vec::new();

        tokio::time::timeout(
            Duration::from_secs(5),
            run_session(&pipeline, rx, interrupt, &mut out, false),
        )
        .await
        .expect("session must end on interrupt")
        .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.ends_with("Your question: \nExiting.\n"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_error_ends_session_with_error() {
        let pipeline = test_pipeline("http://127.0.0.1:9/api/chat");
        let (tx, rx) = mpsc::channel(1);
        tx.try_send(Err(io::Error::new(io::ErrorKind::InvalidData, "not utf-8")))
            .unwrap();

        let result = run_session(&pipeline, rx, std::future::pending(), Vec::<u8>::new(), false).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_answers_and_skips_blank_lines() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": {"content": "There are no tuition fees."}})),
            )
            .mount(&server)
            .await;
        let pipeline = test_pipeline(&format!("{}/api/chat", server.uri()));

        let output = run(&pipeline, "\n   \nAre there tuition fees?\nexit\n", true).await;

        assert!(output.contains("AI answer: There are no tuition fees."));
        assert!(output.contains("  - kb-1 (score "));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_session_alive() {
        let pipeline = test_pipeline("http://127.0.0.1:9/api/chat");

        let output = run(&pipeline, "Are there tuition fees?\nsemester\nexit\n", false).await;

        assert_eq!(output.matches("AI answer: Error: Could not connect").count(), 2);
        assert!(output.contains("Exiting program."));
    }
}
