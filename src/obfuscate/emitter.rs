//! Macro emission: deterministic ordering, final filtering, bounded sinks.
//!
//! The emitter is the last gate. Candidates that survived classification are
//! still dropped here when they collide with a property name, a setter stem,
//! or a UI-bound name; whatever remains is written as `#ifndef`-guarded
//! macro blocks in a strict total order, so re-running emission over the
//! same table yields byte-identical output.

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use tracing::debug;

use crate::core::errors::{Result, SymveilError};
use crate::obfuscate::classifier::CandidateTable;
use crate::obfuscate::exclusions::ExclusionSets;

/// A space-bounded byte sink the emitter writes macro text into.
///
/// Running out of capacity is the sink's contract, not an error: emission
/// simply stops, and the caller inspects the sink's own state.
pub trait MacroSink {
    /// Whether the sink can accept more bytes.
    fn has_capacity(&self) -> bool;

    /// Write bytes, clamped to the remaining capacity.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

/// File-backed sink with an optional byte cap.
#[derive(Debug)]
pub struct FileSink {
    file: File,
    written: u64,
    capacity: Option<u64>,
}

impl FileSink {
    /// Create (truncate) the output file.
    pub fn create(path: impl AsRef<Path>, capacity: Option<u64>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            SymveilError::io(
                format!("failed to create output file: {}", path.display()),
                e,
            )
        })?;
        Ok(Self {
            file,
            written: 0,
            capacity,
        })
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl MacroSink for FileSink {
    fn has_capacity(&self) -> bool {
        self.capacity.map_or(true, |cap| self.written < cap)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let remaining = self
            .capacity
            .map_or(bytes.len(), |cap| (cap - self.written).min(bytes.len() as u64) as usize);
        self.file
            .write_all(&bytes[..remaining])
            .map_err(|e| SymveilError::io("failed to write macro block", e))?;
        self.written += remaining as u64;
        Ok(())
    }
}

/// In-memory sink with an optional byte cap.
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: Vec<u8>,
    capacity: Option<usize>,
}

impl BufferSink {
    /// Unbounded in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory sink that refuses bytes past `capacity`.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            buffer: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// The accumulated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// The accumulated text.
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}

impl MacroSink for BufferSink {
    fn has_capacity(&self) -> bool {
        self.capacity.map_or(true, |cap| self.buffer.len() < cap)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let remaining = self
            .capacity
            .map_or(bytes.len(), |cap| (cap - self.buffer.len()).min(bytes.len()));
        self.buffer.extend_from_slice(&bytes[..remaining]);
        Ok(())
    }
}

/// Emission counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmitStats {
    /// Macro blocks written
    pub emitted: usize,
    /// Candidates dropped because a property or global shares the name
    pub dropped_property: usize,
    /// Candidates dropped because a setter stem matches the lowercased key
    pub dropped_setter: usize,
    /// Candidates dropped because the name is UI-bound
    pub dropped_ui: usize,
    /// Whether emission stopped early on a full sink
    pub sink_exhausted: bool,
}

/// Writes the surviving candidate table as macro blocks.
#[derive(Debug)]
pub struct Emitter {
    padding_width: usize,
}

impl Emitter {
    /// Create an emitter padding original names to `padding_width` columns.
    pub fn new(padding_width: usize) -> Self {
        Self { padding_width }
    }

    /// Filter, sort, and write the candidate table into the sink.
    pub fn emit(
        &self,
        candidates: &CandidateTable,
        exclusions: &ExclusionSets,
        sink: &mut dyn MacroSink,
    ) -> Result<EmitStats> {
        let mut stats = EmitStats::default();

        let mut entries: Vec<(&String, &String)> = candidates.iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            underscore_stripped(a)
                .cmp(&underscore_stripped(b))
                .then_with(|| a.cmp(b))
        });

        for (key, replacement) in entries {
            if !sink.has_capacity() {
                stats.sink_exhausted = true;
                break;
            }
            if exclusions.property_names.contains(key.as_str()) {
                stats.dropped_property += 1;
                continue;
            }
            if exclusions.setter_stems.contains(&key.to_lowercase()) {
                stats.dropped_setter += 1;
                continue;
            }
            if exclusions.ui_bound_names.contains(key.as_str()) {
                stats.dropped_ui += 1;
                continue;
            }

            let padded = format!("{key:<width$}", width = self.padding_width);
            let block =
                format!("#ifndef {padded}\n#define {padded} {replacement}\n#endif\n\n");
            sink.write(block.as_bytes())?;
            stats.emitted += 1;
        }

        debug!(
            emitted = stats.emitted,
            exhausted = stats.sink_exhausted,
            "emission finished"
        );
        Ok(stats)
    }
}

/// Sort key with every underscore removed; the original key breaks ties so
/// the order stays a strict total order.
fn underscore_stripped(key: &str) -> String {
    key.chars().filter(|c| *c != '_').collect()
}
