//! Payload assembly and the sequential submission loop.

use crate::fields::FieldDescriptor;
use crate::synth::Synthesizer;
use reqwest::blocking::Client;
use serde::Serialize;
use std::thread;
use std::time::Duration;

/// Fixed pause between rounds. A deliberate throttle, not a backoff — it
/// never adapts to failures or server feedback.
pub const ROUND_PAUSE: Duration = Duration::from_secs(1);
/// How much response body is kept on a failed round.
pub const DETAIL_LIMIT: usize = 500;

/// Outcome of one POST attempt. Ephemeral, diagnostic only.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub ok: bool,
    pub status: Option<u16>,
    /// Truncated response body, or the transport error string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub attempted: u32,
    pub succeeded: u32,
}

/// Everything the presentation layer sees about one round.
pub struct RoundStatus<'a> {
    pub round: u32,
    pub total: u32,
    pub payload: &'a [(String, String)],
    pub result: &'a SubmissionResult,
}

/// One synthesized (name, value) pair per answer, covering every descriptor.
pub fn build_payload(fields: &[FieldDescriptor], synth: &Synthesizer<'_>) -> Vec<(String, String)> {
    let mut payload = Vec::new();
    for field in fields {
        for value in synth.answers_for(field) {
            payload.push((field.name.clone(), value));
        }
    }
    payload
}

/// POST one answer set. Success is exactly HTTP 200; everything else —
/// including transport failure — is a failed round, never an `Err`.
pub fn submit_once(
    client: &Client,
    submit_url: &str,
    payload: &[(String, String)],
) -> SubmissionResult {
    match client.post(submit_url).form(payload).send() {
        Ok(response) => {
            let status = response.status().as_u16();
            if status == 200 {
                SubmissionResult {
                    ok: true,
                    status: Some(status),
                    detail: None,
                }
            } else {
                let body = response.text().unwrap_or_default();
                SubmissionResult {
                    ok: false,
                    status: Some(status),
                    detail: Some(body.chars().take(DETAIL_LIMIT).collect()),
                }
            }
        }
        Err(e) => SubmissionResult {
            ok: false,
            status: None,
            detail: Some(e.to_string()),
        },
    }
}

/// Run the synthesize-submit loop. Each round rebuilds its payload fresh,
/// failed rounds never abort the batch, and the observer receives every
/// round's status for rendering.
pub fn run_batch(
    client: &Client,
    submit_url: &str,
    fields: &[FieldDescriptor],
    synth: &Synthesizer<'_>,
    rounds: u32,
    observe: &mut dyn FnMut(RoundStatus<'_>),
) -> RunReport {
    let mut succeeded = 0;

    for round in 1..=rounds {
        let payload = build_payload(fields, synth);
        let result = submit_once(client, submit_url, &payload);
        if result.ok {
            succeeded += 1;
        }
        observe(RoundStatus {
            round,
            total: rounds,
            payload: &payload,
            result: &result,
        });
        if round < rounds {
            thread::sleep(ROUND_PAUSE);
        }
    }

    RunReport {
        attempted: rounds,
        succeeded,
    }
}
