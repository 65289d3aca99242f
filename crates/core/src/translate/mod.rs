//! Translation orchestration utilities.
//! This module wires caption parsing, batched backend calls and output writing.

use crate::error::{BackendError, TranslateError};
use crate::files;
use crate::language::Language;
use crate::srt::{self, SubtitleBlock};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, trace, warn};

pub mod anthropic;
mod batch;
#[cfg(test)]
pub(crate) mod testing;

pub use batch::{build_prompt, split_response, BatchTranslator, SEPARATOR};

/// A text-generation service: one prompt in, one text reply out.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Translate a whole caption document.
///
/// Chunks are batched by position; chunks too short to be blocks still take
/// a slot (sent as an empty placeholder) and are dropped from the output.
/// Batches run strictly one after another, and any failure aborts the whole
/// document. Output indices are renumbered 1..N, timing lines are kept.
pub async fn translate_document<B: Backend>(
    translator: &BatchTranslator<B>,
    input: &str,
    target_language: &str,
) -> std::result::Result<String, TranslateError> {
    info!("starting translation to {}", target_language);
    let mut retained = 0;
    let slots: Vec<Option<SubtitleBlock>> = srt::split_chunks(input)
        .iter()
        .map(|chunk| {
            let block = SubtitleBlock::from_chunk(retained + 1, chunk);
            retained += usize::from(block.is_some());
            block
        })
        .collect();
    info!("found {} subtitle chunks to translate", slots.len());

    if let Some(block) = slots
        .iter()
        .flatten()
        .find(|b| b.text.iter().any(|l| l.contains(SEPARATOR)))
    {
        return Err(TranslateError::SeparatorInText { block: block.index });
    }

    let batch_size = translator.batch_size();
    let total_batches = slots.len().div_ceil(batch_size);
    let mut blocks = Vec::with_capacity(slots.len());
    let mut last: Option<Duration> = None;
    for (n, batch) in slots.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch
            .iter()
            .map(|slot| slot.as_ref().map(|b| b.joined_text()).unwrap_or_default())
            .collect();
        let begin = Instant::now();
        let translated = translator
            .translate_batch(&texts, target_language)
            .await
            .map_err(|err| {
                error!("error translating batch {}: {}", n + 1, err);
                err
            })?;
        if translated.len() != texts.len() {
            error!(
                "batch {} is misaligned: sent {} segments, received {}",
                n + 1,
                texts.len(),
                translated.len()
            );
            return Err(TranslateError::AlignmentMismatch {
                batch: n + 1,
                sent: texts.len(),
                received: translated.len(),
            });
        }
        // A blank line inside a segment would split the block on re-parse.
        if let Some(block) = batch
            .iter()
            .zip(&translated)
            .find_map(|(slot, text)| {
                slot.as_ref()
                    .filter(|_| text.lines().any(|l| l.trim().is_empty()))
            })
        {
            error!("block {} came back with a blank line", block.index);
            return Err(TranslateError::BlankLineInText { block: block.index });
        }
        for (j, (slot, text)) in batch.iter().zip(translated).enumerate() {
            match slot {
                Some(block) => {
                    let mut block = block.clone();
                    block.set_text(&text);
                    blocks.push(block);
                }
                None => warn!(
                    "skipping chunk {} due to insufficient lines",
                    n * batch_size + j + 1
                ),
            }
        }

        let elapsed = begin.elapsed();
        let first = n * batch_size + 1;
        let end = first + batch.len() - 1;
        info!(
            "translated chunks {}-{} in {} ms ({}%)",
            first,
            end,
            elapsed.as_millis(),
            end * 100 / slots.len()
        );
        let remaining = total_batches - n - 1;
        if let Some(prev) = last.filter(|_| remaining > 0) {
            info!("ETA: {}", format_eta(estimate_remaining(prev, elapsed, remaining)));
        }
        last = Some(elapsed);
    }
    Ok(srt::format(&blocks))
}

/// Translate the caption file at `input` and write the result.
/// Without an explicit `output`, the result lands next to the input as
/// `<stem>_<code>.srt`.
pub async fn process_file<B: Backend>(
    input: &Path,
    output: Option<&Path>,
    translator: &BatchTranslator<B>,
    language: Language,
) -> Result<PathBuf> {
    trace!("process_file input={}", input.display());
    let content = files::read_captions(input)?;
    let translated = translate_document(translator, &content, language.name())
        .await
        .with_context(|| format!("translating {}", input.display()))?;
    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => files::sibling_path(input, language.code()),
    };
    info!("writing output to {}", out_path.display());
    files::write_atomic(&out_path, &translated)?;
    info!("wrote {}", out_path.display());
    Ok(out_path)
}

/// Average of the last two batch durations times the batches left.
fn estimate_remaining(prev: Duration, curr: Duration, remaining_batches: usize) -> Duration {
    (prev + curr) / 2 * remaining_batches as u32
}

/// Format a duration as "X minute(s) Y second(s)".
fn format_eta(d: Duration) -> String {
    let plural = |n: u64| if n == 1 { "" } else { "s" };
    let minutes = d.as_secs() / 60;
    let seconds = d.as_secs() % 60;
    if minutes > 0 {
        format!(
            "{} minute{} {} second{}",
            minutes,
            plural(minutes),
            seconds,
            plural(seconds)
        )
    } else {
        format!("{} second{}", seconds, plural(seconds))
    }
}
