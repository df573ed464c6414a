//! Interactive query loop.
//!
//! Each turn runs two tasks: one animates the thinking indicator, one
//! performs the blocking answer computation. Two fresh one-shot channels
//! order their output — the worker fires `computation_done` when the
//! answer is ready, the printer clears its line and fires `printer_done`,
//! and only then does the worker print the answer. The turn ends when both
//! tasks are joined, so indicator frames can never interleave with the
//! answer line.

use sibyl_core::{AppError, AppResult};
use sibyl_qa::Assistant;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

/// Greeting printed when the loop starts.
const GREETING: &str = "[bot]: Bonjour, votre assistant a été initialisée. Tappez 'ctrl + c' pour quitter l'app. Vous pouvez me poser n'importe quelle question et j'essaierai d'y répondre du mieux que je peux !";

/// Rotating indicator frames.
const FRAMES: [&str; 4] = ["   ", ".  ", ".. ", "..."];

/// Indicator frame rate.
const FRAMES_PER_SECOND: f64 = 4.0;

/// Shared handle to the terminal (or a capture buffer in tests).
type Sink = Arc<Mutex<dyn Write + Send>>;

/// Run the interactive loop until end of input or Ctrl-C.
pub async fn run(assistant: Arc<Assistant>) -> AppResult<()> {
    println!("{}", GREETING);

    let sink: Sink = Arc::new(Mutex::new(std::io::stdout()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!(">>> ");
        std::io::stdout().flush()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(query) => {
                        run_turn(assistant.clone(), query, sink.clone(), FRAMES_PER_SECOND)
                            .await?
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!("Interactive loop finished");
    Ok(())
}

/// Run one query turn: spawn the indicator and worker tasks and join both.
///
/// Errors from the answer pipeline are fatal to the turn, not to the loop:
/// they are printed as a user-facing line and the next prompt follows.
async fn run_turn(
    assistant: Arc<Assistant>,
    query: String,
    sink: Sink,
    fps: f64,
) -> AppResult<()> {
    // Fresh one-shot signals every turn; they are never reused.
    let (computation_done_tx, computation_done_rx) = oneshot::channel::<()>();
    let (printer_done_tx, printer_done_rx) = oneshot::channel::<()>();

    let printer = tokio::spawn(animate(
        sink.clone(),
        computation_done_rx,
        printer_done_tx,
        fps,
    ));

    let worker = tokio::spawn(async move {
        let answer = assistant.answer(&query).await;

        // Hand the terminal back to the printer before writing the answer.
        let _ = computation_done_tx.send(());
        let _ = printer_done_rx.await;

        if let Ok(mut out) = sink.lock() {
            match answer {
                Ok(text) => {
                    let _ = writeln!(out, "[bot]: {}", text);
                }
                Err(err) => {
                    tracing::warn!("Query turn failed: {}", err);
                    let _ = writeln!(out, "[bot]: désolée, une erreur est survenue : {}", err);
                }
            }
            let _ = out.flush();
        }
    });

    worker
        .await
        .map_err(|e| AppError::Other(format!("Worker task failed: {}", e)))?;
    printer
        .await
        .map_err(|e| AppError::Other(format!("Printer task failed: {}", e)))?;

    Ok(())
}

/// Print the rotating indicator until the computation signal fires, then
/// clear the line and release the worker.
async fn animate(
    sink: Sink,
    mut computation_done: oneshot::Receiver<()>,
    printer_done: oneshot::Sender<()>,
    fps: f64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps));
    let mut frame = 0usize;

    loop {
        tokio::select! {
            _ = &mut computation_done => break,
            _ = interval.tick() => {
                if let Ok(mut out) = sink.lock() {
                    let _ = write!(out, "\r[bot]: {}", FRAMES[frame]);
                    let _ = out.flush();
                }
                frame = (frame + 1) % FRAMES.len();
            }
        }
    }

    // Wipe the last frame so the answer starts on a clean line.
    if let Ok(mut out) = sink.lock() {
        let width = "[bot]: ".len() + FRAMES[0].len();
        let _ = write!(out, "\r{:width$}\r", "");
        let _ = out.flush();
    }

    let _ = printer_done.send(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use sibyl_qa::{build_assistant, providers::MockBackend, Bot};
    use sibyl_core::config::WrapperConfig;
    use sibyl_retrieval::{Document, DocumentSet, TfIdfRetriever, WithUrls};

    fn assistant(backend: MockBackend, wrappers: &[WrapperConfig]) -> Arc<Assistant> {
        let docs = Arc::new(DocumentSet::new(vec![
            Document {
                content: "AAAA".to_string(),
                url: Some("u1".to_string()),
                title: None,
            },
            Document {
                content: "BB".to_string(),
                url: Some("u2".to_string()),
                title: None,
            },
        ]));
        let base = TfIdfRetriever::new(docs.clone(), &["content".to_string()]).unwrap();
        let retriever = WithUrls::new(base, docs).unwrap();
        let bot = Bot::new(Arc::new(retriever), Box::new(backend)).with_k_docs(2);
        Arc::new(build_assistant(bot, wrappers).unwrap())
    }

    fn capture() -> (Arc<Mutex<Vec<u8>>>, Sink) {
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink: Sink = buffer.clone();
        (buffer, sink)
    }

    fn captured_text(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[tokio::test]
    async fn test_answer_prints_after_every_indicator_byte() {
        let (buffer, sink) = capture();

        // slow computation relative to the frame rate: several frames print
        let slow = assistant(MockBackend::extractive(), &[]);
        run_turn(slow, "aaaa".to_string(), sink, 200.0).await.unwrap();

        let output = captured_text(&buffer);
        assert!(output.ends_with("[bot]: AAAA\n"), "got: {:?}", output);

        // every carriage return (indicator traffic) precedes the answer
        let answer_pos = output.rfind("[bot]: AAAA").unwrap();
        assert!(output.rfind('\r').unwrap() < answer_pos);
    }

    #[tokio::test]
    async fn test_fast_worker_still_waits_for_printer() {
        let (buffer, sink) = capture();

        // the mock answers immediately, well before the next frame tick
        let fast = assistant(MockBackend::extractive(), &[]);
        run_turn(fast, "aaaa".to_string(), sink, 2.0).await.unwrap();

        let output = captured_text(&buffer);
        assert!(output.ends_with("[bot]: AAAA\n"), "got: {:?}", output);

        // nothing follows the answer line: the printer finished first
        let after_answer = &output[output.rfind("[bot]: AAAA").unwrap()..];
        assert_eq!(after_answer, "[bot]: AAAA\n");
    }

    #[tokio::test]
    async fn test_turn_error_prints_user_facing_line() {
        let (buffer, sink) = capture();

        // min-certainty over a generative backend: score is missing at
        // query time, the turn fails but the loop survives
        let wrappers = vec![WrapperConfig {
            kind: "min-certainty".to_string(),
            threshold: None,
            prompt_template: None,
        }];
        let failing = assistant(MockBackend::generative().with_answer("libre"), &wrappers);

        run_turn(failing, "aaaa".to_string(), sink, 50.0)
            .await
            .unwrap();

        let output = captured_text(&buffer);
        assert!(output.contains("désolée, une erreur est survenue"));
        assert!(output.contains("score"));
    }

    #[tokio::test]
    async fn test_signals_are_fresh_each_turn() {
        let (buffer, sink) = capture();
        let bot = assistant(MockBackend::extractive(), &[]);

        // two consecutive turns over the same assistant and sink
        run_turn(bot.clone(), "aaaa".to_string(), sink.clone(), 100.0)
            .await
            .unwrap();
        run_turn(bot, "bb".to_string(), sink, 100.0).await.unwrap();

        let output = captured_text(&buffer);
        assert_eq!(output.matches("[bot]: AAAA\n").count(), 1);
        assert_eq!(output.matches("[bot]: BB\n").count(), 1);
    }
}
