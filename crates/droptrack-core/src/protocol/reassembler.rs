use tracing::{trace, warn};

use crate::config::stream::{DEFAULT_MAX_BUFFER, FRAME_DELIMITER};
use crate::error::{Error, Result};

/// Turns an ordered sequence of byte chunks into zero-delimited frames.
///
/// Each call to [`push`](Self::push) drains every complete frame currently
/// buffered; only the trailing partial frame is retained. An empty frame
/// (a delimiter directly at the start of the buffer) is discarded as a
/// stray byte.
#[derive(Debug, Clone)]
pub struct FrameReassembler {
    buffer: Vec<u8>,
    max_buffer: usize,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_BUFFER)
    }

    /// Create a reassembler that fails once more than `max_buffer` undelimited bytes accumulate.
    pub fn with_limit(max_buffer: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_buffer,
        }
    }

    /// Append a chunk and return all frames it completes, in arrival order.
    ///
    /// When the retained partial frame exceeds the configured ceiling it is
    /// discarded and [`Drained::overflow`] carries [`Error::BufferOverflow`];
    /// frames completed by the same chunk are still returned. The stream
    /// should be treated as broken after an overflow.
    pub fn push(&mut self, chunk: &[u8]) -> Drained {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.buffer[start..]
            .iter()
            .position(|&b| b == FRAME_DELIMITER)
        {
            let end = start + pos;
            if end == start {
                trace!("Discarding stray delimiter");
            } else {
                frames.push(self.buffer[start..end].to_vec());
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > self.max_buffer {
            let buffered = self.buffer.len();
            warn!(
                "Reassembly buffer overflow ({} bytes, limit {})",
                buffered, self.max_buffer
            );
            self.buffer.clear();
            return Drained {
                frames,
                overflow: Some(Error::BufferOverflow {
                    buffered,
                    limit: self.max_buffer,
                }),
            };
        }

        Drained {
            frames,
            overflow: None,
        }
    }

    /// Bytes of the incomplete trailing frame.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Outcome of one [`FrameReassembler::push`].
#[derive(Debug, Default)]
pub struct Drained {
    /// Complete frames, in arrival order.
    pub frames: Vec<Vec<u8>>,
    /// Set when the partial frame outgrew the ceiling and was discarded.
    pub overflow: Option<Error>,
}

impl Drained {
    /// Frames of a push that must not overflow.
    pub fn into_frames(self) -> Result<Vec<Vec<u8>>> {
        match self.overflow {
            Some(e) => Err(e),
            None => Ok(self.frames),
        }
    }
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}
