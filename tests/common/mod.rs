#![allow(dead_code)]

use flate2::{Decompress, FlushDecompress};
use futures::io::AsyncWrite;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use ws_frame_sender::deflate::DEFLATE_TRAILER;

/// Transport that keeps every write as a separate buffer.
#[derive(Default)]
pub struct RecordingTransport {
    pub writes: Vec<Vec<u8>>,
    pub fail_after: Option<usize>,
}

impl RecordingTransport {
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl AsyncWrite for RecordingTransport {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fail_after == Some(self.writes.len()) {
            return Poll::Ready(Err(io::ErrorKind::ConnectionReset.into()));
        }
        self.writes.push(buf.to_vec());
        Poll::Ready(Ok(buf.len()))
    }
    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[derive(Debug)]
pub struct ParsedFrame {
    pub fin: bool,
    pub rsv: u8,
    pub opcode: u8,
    pub len_marker: u8,
    pub mask: Option<[u8; 4]>,
    pub payload: Vec<u8>,
}

/// Splits `buffer` into frames and unmasks their payloads.
pub fn parse_frames(mut buffer: &[u8]) -> Vec<ParsedFrame> {
    let mut frames = Vec::new();
    while !buffer.is_empty() {
        let len_marker = buffer[1] & 0x7F;
        let extra_payload_len_bytes = match len_marker {
            0..=125 => 0usize,
            126 => 2,
            _ => 8,
        };
        let mut payload_len = [0u8; 8];
        match extra_payload_len_bytes {
            0 => payload_len[7] = len_marker,
            2 => payload_len[6..8].copy_from_slice(&buffer[2..4]),
            _ => payload_len.copy_from_slice(&buffer[2..10]),
        }
        let payload_len = u64::from_be_bytes(payload_len) as usize;
        let mut offset = 2 + extra_payload_len_bytes;
        let mask = match buffer[1] & 0x80 {
            0 => None,
            _ => {
                let mut mask = [0u8; 4];
                mask.copy_from_slice(&buffer[offset..offset + 4]);
                offset += 4;
                Some(mask)
            }
        };
        let mut payload = buffer[offset..offset + payload_len].to_vec();
        if let Some(mask) = mask {
            for (i, byte) in payload.iter_mut().enumerate() {
                *byte ^= mask[i % 4];
            }
        }
        frames.push(ParsedFrame {
            fin: buffer[0] & 0x80 != 0,
            rsv: (buffer[0] >> 4) & 0x7,
            opcode: buffer[0] & 0x0F,
            len_marker,
            mask,
            payload,
        });
        buffer = &buffer[offset + payload_len..];
    }
    frames
}

/// Inflates one permessage-deflate payload, continuing the context of `decompress`.
pub fn inflate(decompress: &mut Decompress, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut input = payload.to_vec();
    input.extend_from_slice(&DEFLATE_TRAILER);
    let mut output = Vec::new();
    let mut offset = 0;
    loop {
        output.reserve(4096);
        let before_in = decompress.total_in();
        decompress.decompress_vec(&input[offset..], &mut output, FlushDecompress::Sync)?;
        offset += (decompress.total_in() - before_in) as usize;
        if offset == input.len() && output.len() < output.capacity() {
            return Ok(output);
        }
    }
}
