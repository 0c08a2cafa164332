//! IMBE voice frames for generated test traffic.
//!
//! A voice source is text with one frame per line: 22 hex digits, the first
//! 12 holding U0..U3 and the last 10 holding U4..U7. Blank lines and lines
//! starting with `#` are ignored. The generator hands out frames in order,
//! wrapping when the source runs out, and dresses each one as the IMBE
//! voice block for its position in the superframe.

use std::io::BufRead;

use crate::bits::extract;
use crate::blocks::ImbeVoiceBlock;
use crate::constants::IMBE_FRAMES_PER_CYCLE;
use crate::error::{P25Error, P25PayloadError};

const FRAME_HEX_DIGITS: usize = 22;
const LOW_VECTOR_DIGITS: usize = 12;

/// Superframe counter wraps after four superframes.
const SUPER_FRAME_COUNTER_MODULUS: usize = 4;

/// Encryption sync carried at positions 12..=17 of clear voice.
fn encryption_sync(position: usize) -> [u8; 4] {
    match position {
        15 => [0x80, 0x00, 0x00, 0x00],
        16 => [0xAC, 0xB8, 0xA4, 0x00],
        17 => [0x9B, 0xDC, 0x75, 0x00],
        _ => [0; 4],
    }
}

/// Parses one 22-digit frame line into U0..U7.
///
/// # Errors
/// - [`P25PayloadError::MalformedHex`] - Wrong length or non-hex digit
pub fn parse_frame(line: &str) -> Result<[u16; 8], P25PayloadError> {
    let line = line.trim();
    let malformed = || P25PayloadError::MalformedHex(line.to_string());
    if line.len() != FRAME_HEX_DIGITS || !line.is_ascii() {
        return Err(malformed());
    }
    let low = u64::from_str_radix(&line[..LOW_VECTOR_DIGITS], 16).map_err(|_| malformed())?;
    let high = u64::from_str_radix(&line[LOW_VECTOR_DIGITS..], 16).map_err(|_| malformed())?;
    Ok([
        extract(low, 36, 12) as u16,
        extract(low, 24, 12) as u16,
        extract(low, 12, 12) as u16,
        extract(low, 0, 12) as u16,
        extract(high, 29, 11) as u16,
        extract(high, 18, 11) as u16,
        extract(high, 7, 11) as u16,
        extract(high, 0, 7) as u16,
    ])
}

/// Cycles through a fixed set of IMBE frames.
#[derive(Debug, Clone)]
pub struct ImbeVoiceGenerator {
    frames: Vec<[u16; 8]>,
    next_position: usize,
}

impl ImbeVoiceGenerator {
    /// Loads frames from text.
    ///
    /// # Errors
    /// - [`P25PayloadError::MalformedHex`] - A line is not a frame, or there are no frames
    pub fn from_text(text: &str) -> Result<Self, P25PayloadError> {
        let frames = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(parse_frame)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_frames(frames)
    }

    /// Loads frames from a reader, such as a buffered file.
    ///
    /// # Errors
    /// - [`P25Error::Io`] - Reading failed
    /// - [`P25Error::Payload`] - The text is not a frame list
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, P25Error> {
        let mut text = String::new();
        for line in reader.lines() {
            text.push_str(&line?);
            text.push('\n');
        }
        Ok(Self::from_text(&text)?)
    }

    /// Wraps already decoded frames.
    ///
    /// # Errors
    /// - [`P25PayloadError::MalformedHex`] - `frames` is empty
    pub fn from_frames(frames: Vec<[u16; 8]>) -> Result<Self, P25PayloadError> {
        if frames.is_empty() {
            return Err(P25PayloadError::MalformedHex(
                "voice source holds no frames".to_string(),
            ));
        }
        tracing::debug!(frames = frames.len(), "Loaded IMBE voice frames");
        Ok(Self {
            frames,
            next_position: 1,
        })
    }

    /// Number of distinct frames in the source.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The voice block for the 1-based stream `position`: frame
    /// `(position - 1) % len`, the ISSI frame type and trailer of the
    /// superframe slot, and SF counting completed superframes modulo 4.
    /// Position 0 is treated as 1.
    pub fn block_at(&self, position: usize) -> ImbeVoiceBlock {
        let position = position.max(1);
        let index = position - 1;
        let slot = index % IMBE_FRAMES_PER_CYCLE + 1;
        let super_frame = (index / IMBE_FRAMES_PER_CYCLE) % SUPER_FRAME_COUNTER_MODULUS;

        let mut block = ImbeVoiceBlock::at_position(slot);
        let frame = self.frames[index % self.frames.len()];
        if block.set_message_vectors(frame).is_err() {
            tracing::warn!(position, "Voice frame exceeds vector widths");
        }
        if block.set_super_frame(super_frame as u8).is_err() {
            tracing::warn!(position, "Superframe counter out of range");
        }
        if (12..=17).contains(&slot)
            && block.set_additional_frame_data(encryption_sync(slot).to_vec()).is_err()
        {
            tracing::warn!(position, "Encryption sync rejected");
        }
        block
    }

    /// The next block of the stream.
    pub fn next_block(&mut self) -> ImbeVoiceBlock {
        let block = self.block_at(self.next_position);
        self.next_position += 1;
        block
    }

    /// Position the next call to [`next_block`](Self::next_block) uses.
    pub fn position(&self) -> usize {
        self.next_position
    }

    /// Restarts the stream at position 1.
    pub fn reset(&mut self) {
        self.next_position = 1;
    }
}

impl Iterator for ImbeVoiceGenerator {
    type Item = ImbeVoiceBlock;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_block())
    }
}
