//! # Full Decode
//!
//! Decodes the whole input under one candidate, on explicit request.
//!
//! Linear and companded candidates go straight through the codec. ADPCM
//! candidates are handed to the external decoder engine: the input is
//! written under a per-call name, then a fixed list of format-hint variants
//! is tried in order until one produces 16-bit PCM. Failures of earlier
//! variants are discarded once a later one succeeds.

use std::sync::Arc;

use bridge_traits::decoder::DecoderEngine;
use bytes::Bytes;
use core_runtime::config::ExplorerSettings;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::codec;
use crate::engine::EngineCache;
use crate::error::{PcmError, Result};
use crate::format::{Candidate, DecodedBuffer, Encoding};
use crate::wav;

/// One way of describing the input format to the external decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintVariant {
    /// Short name used in failure reports
    pub name: &'static str,
    /// Arguments placed before the input file
    pub input_args: Vec<String>,
}

/// File extension the input is written with for the external decoder.
pub fn input_extension(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::OkiAdpcm => "vox",
        Encoding::G726Adpcm => "g726",
        _ => "raw",
    }
}

/// Hint variants for `encoding`, in the order they are attempted.
///
/// Every variant carries the assumed sample rate and the channel count.
pub fn hint_variants(encoding: Encoding, sample_rate: u32, channels: u16) -> Vec<HintVariant> {
    let framing = |args: &[&str]| -> Vec<String> {
        let mut out: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        out.extend([
            "-ar".to_string(),
            sample_rate.to_string(),
            "-ac".to_string(),
            channels.to_string(),
        ]);
        out
    };

    match encoding {
        Encoding::OkiAdpcm => vec![
            HintVariant {
                name: "oki-raw",
                input_args: framing(&["-f", "u8", "-acodec", "adpcm_ima_oki"]),
            },
            HintVariant {
                name: "oki-codec",
                input_args: framing(&["-acodec", "adpcm_ima_oki"]),
            },
        ],
        Encoding::G726Adpcm => vec![
            HintVariant {
                name: "g726le",
                input_args: framing(&["-f", "g726le", "-code_size", "4"]),
            },
            HintVariant {
                name: "g726",
                input_args: framing(&["-f", "g726", "-code_size", "4"]),
            },
            HintVariant {
                name: "g726-codec",
                input_args: framing(&["-acodec", "adpcm_g726le"]),
            },
        ],
        _ => Vec::new(),
    }
}

/// Full argument vector for one attempt: hints, input, then 16-bit output.
pub fn build_argv(variant: &HintVariant, input: &str, output: &str, channels: u16) -> Vec<String> {
    let channels = channels.to_string();
    let mut argv = variant.input_args.clone();
    argv.extend(
        [
            "-i",
            input,
            "-f",
            "s16le",
            "-acodec",
            "pcm_s16le",
            "-ac",
            channels.as_str(),
            output,
        ]
        .into_iter()
        .map(str::to_string),
    );
    argv
}

/// Runs full decodes, delegating ADPCM candidates to the cached engine.
pub struct FullDecoder {
    engines: Arc<EngineCache>,
}

impl FullDecoder {
    pub fn new(engines: Arc<EngineCache>) -> Self {
        Self { engines }
    }

    pub fn engines(&self) -> &Arc<EngineCache> {
        &self.engines
    }

    /// Decode all of `input` as `candidate`.
    ///
    /// Never returns a partial buffer: any failure is reported as an error.
    #[instrument(skip(self, input, candidate, settings), fields(candidate = %candidate.id, bytes = input.len()))]
    pub async fn decode_full(
        &self,
        input: &Bytes,
        candidate: &Candidate,
        settings: &ExplorerSettings,
    ) -> Result<DecodedBuffer> {
        if !candidate.needs_external_decoder() {
            let buffer = codec::decode(input, &candidate.format, None)?;
            debug!(frames = buffer.frames(), "Decoded in-process");
            return Ok(buffer);
        }

        let engine = self.engines.acquire().await?;
        self.decode_external(engine, input, candidate, settings.assumed_sample_rate)
            .await
    }

    /// Fully decode `candidate` and wrap the result in a WAVE container
    /// labeled with the playback sample rate.
    pub async fn export_candidate(
        &self,
        input: &Bytes,
        candidate: &Candidate,
        settings: &ExplorerSettings,
    ) -> Result<Bytes> {
        let buffer = self.decode_full(input, candidate, settings).await?;
        Ok(wav::export_buffer(&buffer, settings.effective_playback_rate()))
    }

    async fn decode_external(
        &self,
        engine: Arc<dyn DecoderEngine>,
        input: &Bytes,
        candidate: &Candidate,
        sample_rate: u32,
    ) -> Result<DecodedBuffer> {
        let channels = candidate.channels();
        let token = Uuid::new_v4().simple().to_string();
        let input_name = format!("in-{}.{}", token, input_extension(candidate.encoding()));
        let output_name = format!("out-{}.raw", token);

        // Registered before the first write so an aborted decode still cleans up.
        let scratch = ScratchFiles::new(
            Arc::clone(&engine),
            vec![input_name.clone(), output_name.clone()],
        );

        engine.write_input(&input_name, input.clone()).await?;

        let mut attempts = Vec::new();
        let mut decoded = None;
        for variant in hint_variants(candidate.encoding(), sample_rate, channels) {
            let argv = build_argv(&variant, &input_name, &output_name, channels);
            if let Err(e) = engine.execute(&argv).await {
                warn!(variant = variant.name, error = %e, "Hint variant failed");
                attempts.push(format!("{}: {}", variant.name, e));
                continue;
            }

            match engine.read_output(&output_name).await {
                Ok(pcm) => {
                    let buffer = codec::decode_pcm16le(&pcm, channels);
                    if buffer.is_empty() {
                        warn!(variant = variant.name, "Hint variant produced no audio");
                        attempts.push(format!("{}: empty output", variant.name));
                    } else {
                        info!(variant = variant.name, frames = buffer.frames(), "External decode succeeded");
                        decoded = Some(buffer);
                        break;
                    }
                }
                Err(e) => {
                    warn!(variant = variant.name, error = %e, "Could not read decoder output");
                    attempts.push(format!("{}: {}", variant.name, e));
                }
            }
            discard(engine.as_ref(), &output_name).await;
        }

        scratch.release().await;

        decoded.ok_or_else(|| PcmError::ExternalDecodeFailed {
            candidate: candidate.id.clone(),
            attempts,
            log: engine.take_log(),
        })
    }
}

async fn discard(engine: &dyn DecoderEngine, name: &str) {
    if let Err(e) = engine.remove(name).await {
        debug!(file = name, error = %e, "Could not remove engine file");
    }
}

/// Per-call engine files, removed on [`release`](ScratchFiles::release) or,
/// if the owning future is dropped first, by a task spawned from `Drop`.
struct ScratchFiles {
    engine: Arc<dyn DecoderEngine>,
    names: Vec<String>,
}

impl ScratchFiles {
    fn new(engine: Arc<dyn DecoderEngine>, names: Vec<String>) -> Self {
        Self { engine, names }
    }

    async fn release(mut self) {
        for name in std::mem::take(&mut self.names) {
            discard(self.engine.as_ref(), &name).await;
        }
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        if self.names.is_empty() {
            return;
        }
        let names = std::mem::take(&mut self.names);
        let engine = Arc::clone(&self.engine);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(files = names.len(), "Removing engine files of an abandoned decode");
                handle.spawn(async move {
                    for name in names {
                        discard(engine.as_ref(), &name).await;
                    }
                });
            }
            Err(_) => warn!(files = ?names, "No runtime left to remove engine files"),
        }
    }
}
