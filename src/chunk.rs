//! Strings longer than one bus transaction.
//!
//! Text is cut into 31-byte chunks, each carried by a 32-byte frame whose
//! first byte tells the gateway whether it starts a new string or continues
//! the previous one. Short final chunks are zero padded, which also
//! terminates the string. A final chunk that is exactly full has no room for
//! a terminator, so the receiver takes the string length as 31 times the
//! frame count in that case. Text must therefore not contain NUL bytes.

use anyhow::Result;

use crate::constants::{CHUNK_PAYLOAD_SIZE, MAX_FRAME_SIZE};
use crate::protocol::{Command, Opcode};

/// Number of frames needed for `len` bytes of text. Empty text still takes
/// one frame.
pub const fn frame_count(len: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.div_ceil(CHUNK_PAYLOAD_SIZE)
    }
}

/// Cut `text` into the commands that upload it, in transmission order.
pub fn split(text: &[u8]) -> Vec<Command> {
    if text.is_empty() {
        return vec![Command::SendString(Vec::new())];
    }
    text.chunks(CHUNK_PAYLOAD_SIZE)
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                Command::SendString(chunk.to_vec())
            } else {
                Command::SendStringContinued(chunk.to_vec())
            }
        })
        .collect()
}

/// Rebuild a string from received frames, the way the gateway does.
pub fn reassemble<F: AsRef<[u8]>>(frames: &[F]) -> Result<Vec<u8>> {
    anyhow::ensure!(!frames.is_empty(), "no string frames received");

    let mut text = Vec::with_capacity(frames.len() * CHUNK_PAYLOAD_SIZE);
    for (i, frame) in frames.iter().enumerate() {
        let frame = frame.as_ref();
        anyhow::ensure!(
            frame.len() == MAX_FRAME_SIZE,
            "string frame #{} is {} bytes, expected {}",
            i,
            frame.len(),
            MAX_FRAME_SIZE
        );
        let expected = if i == 0 {
            Opcode::SendString
        } else {
            Opcode::SendStringContinued
        };
        anyhow::ensure!(
            frame[0] == expected as u8,
            "string frame #{}: expected opcode {:?}, got {}",
            i,
            expected,
            frame[0]
        );
        text.extend_from_slice(&frame[1..]);
    }

    if let Some(end) = text.iter().position(|&b| b == 0) {
        text.truncate(end);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_for(len: usize) -> Vec<Vec<u8>> {
        let text: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
        split(&text)
            .into_iter()
            .map(|cmd| cmd.into_raw().unwrap())
            .collect()
    }

    #[test]
    fn test_frame_counts() {
        for (len, count) in [(0, 1), (1, 1), (30, 1), (31, 1), (32, 2), (62, 2), (63, 3)] {
            assert_eq!(frame_count(len), count, "len {}", len);
            assert_eq!(frames_for(len).len(), count, "len {}", len);
        }
    }

    #[test]
    fn test_first_frame_opcode_differs() {
        let frames = frames_for(100);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0][0], Opcode::SendString as u8);
        for frame in &frames[1..] {
            assert_eq!(frame[0], Opcode::SendStringContinued as u8);
            assert_ne!(frame[0], frames[0][0]);
        }
        assert!(frames.iter().all(|f| f.len() == MAX_FRAME_SIZE));
    }

    #[test]
    fn test_empty_text_is_one_blank_frame() {
        let frames = frames_for(0);
        assert_eq!(frames[0][0], Opcode::SendString as u8);
        assert!(frames[0][1..].iter().all(|&b| b == 0));
        assert_eq!(reassemble(&frames).unwrap(), b"");
    }

    #[test]
    fn test_reassemble_lengths() {
        for len in [1, 30, 31, 32, 61, 62, 63, 200] {
            let text: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
            assert_eq!(reassemble(&frames_for(len)).unwrap(), text, "len {}", len);
        }
    }

    #[test]
    fn test_reassemble_rejects_bad_sequence() {
        let mut frames = frames_for(40);
        frames.swap(0, 1);
        assert!(reassemble(&frames).is_err());

        let frames: Vec<Vec<u8>> = Vec::new();
        assert!(reassemble(&frames).is_err());
    }
}
