//! Runs one exchange off the UI thread.

use futures::future::AbortRegistration;
use providers::{AiClient, CallOptions};
use shared::agent_api::InlineImage;
use shared::error::ChatError;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

/// Result from background AI generation
#[derive(Debug)]
pub struct AiResult {
    pub result: Result<String, ChatError>,
}

/// Everything a background exchange needs, moved onto its thread.
pub struct ExchangeJob {
    pub client: AiClient,
    pub text: String,
    pub image: Option<Arc<InlineImage>>,
    pub deadline: Duration,
}

/// Run AI generation on the current (background) thread and report the outcome.
pub fn run_ai_generation(job: ExchangeJob, tx: Sender<AiResult>, abort_reg: AbortRegistration) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start async runtime");
            let _ = tx.send(AiResult {
                result: Err(ChatError::Provider(format!(
                    "failed to start async runtime: {}",
                    e
                ))),
            });
            return;
        }
    };

    let options = CallOptions::default()
        .with_deadline(job.deadline)
        .with_abort(abort_reg);
    let result = rt.block_on(job.client.generate_response(&job.text, job.image, options));

    // Receiver is gone only if the session was dropped mid-flight
    let _ = tx.send(AiResult { result });
}

/// Spawn the exchange on its own thread. A panic is reported as a failed exchange.
pub fn spawn_exchange(job: ExchangeJob, tx: Sender<AiResult>, abort_reg: AbortRegistration) {
    std::thread::spawn(move || {
        let tx_panic = tx.clone();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            run_ai_generation(job, tx, abort_reg);
        }));
        if res.is_err() {
            tracing::error!("exchange worker panicked");
            let _ = tx_panic.send(AiResult {
                result: Err(ChatError::Provider(
                    "something went wrong while processing that request, please try again"
                        .to_string(),
                )),
            });
        }
    });
}
