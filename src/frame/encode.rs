use crate::frame::{apply_mask, FrameHead, Payload, MAX_HEAD_LEN};
use bytes::Bytes;
use futures::io::AsyncWrite;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Payloads shorter than this are copied behind their head and written in one go.
pub const DEFAULT_MERGE_THRESHOLD: usize = 32 * 1024;

/// A frame serialized into one or two buffers, each handed to the transport as a separate write.
#[derive(Clone, Debug)]
pub struct EncodedFrame {
    writes: Vec<Bytes>,
    current: usize,
    written: usize,
}

impl EncodedFrame {
    // Shared payloads are never masked in place, they are copied behind the head instead.
    pub fn new(mut head: FrameHead, payload: Payload, merge_threshold: usize) -> Self {
        head.payload_len = payload.len() as u64;
        if payload.is_empty() {
            head.mask = head.mask.map(|_| [0u8; 4]);
            let mut buffer = [0u8; MAX_HEAD_LEN];
            let n = head.encode(&mut buffer);
            return Self::from_writes(vec![Bytes::copy_from_slice(&buffer[..n])]);
        }
        let head_len = head.len_bytes();
        let merge = payload.len() < merge_threshold || (head.masked() && payload.is_shared());
        if merge {
            let mut buffer = vec![0u8; head_len + payload.len()];
            head.encode(&mut buffer);
            buffer[head_len..].copy_from_slice(payload.as_slice());
            if let Some(mask) = head.mask {
                apply_mask(mask, &mut buffer[head_len..]);
            }
            return Self::from_writes(vec![buffer.into()]);
        }
        let mut head_buffer = vec![0u8; head_len];
        head.encode(&mut head_buffer);
        let payload = match payload {
            Payload::Owned(mut vec) => {
                if let Some(mask) = head.mask {
                    apply_mask(mask, &mut vec);
                }
                Bytes::from(vec)
            }
            Payload::Shared(bytes) => bytes,
        };
        Self::from_writes(vec![head_buffer.into(), payload])
    }
    fn from_writes(writes: Vec<Bytes>) -> Self {
        Self {
            writes,
            current: 0,
            written: 0,
        }
    }
    pub fn writes(&self) -> &[Bytes] {
        &self.writes
    }
    pub fn len_bytes(&self) -> usize {
        self.writes.iter().map(Bytes::len).sum()
    }
    pub fn poll_write<T: AsyncWrite + Unpin>(
        &mut self,
        transport: &mut T,
        cx: &mut Context<'_>,
    ) -> Poll<io::Result<()>> {
        while let Some(buffer) = self.writes.get(self.current) {
            let remaining = &buffer[self.written..];
            if remaining.is_empty() {
                self.current += 1;
                self.written = 0;
                continue;
            }
            match Pin::new(&mut *transport).poll_write(cx, remaining) {
                Poll::Ready(Ok(0)) => return Poll::Ready(Err(io::ErrorKind::WriteZero.into())),
                Poll::Ready(Ok(n)) => self.written += n,
                Poll::Ready(Err(err)) => return Poll::Ready(Err(err)),
                Poll::Pending => return Poll::Pending,
            }
        }
        Poll::Ready(Ok(()))
    }
}
