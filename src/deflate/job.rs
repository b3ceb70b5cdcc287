use crate::deflate::DeflateStream;
use futures::stream::StreamExt;
use std::future::Future;
use std::io;
use std::mem::take;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Empty stored block emitted by a sync flush. RFC 7692 section 7.2.1 removes it from the
/// compressed payload; the receiving end appends it again before inflating.
pub const DEFLATE_TRAILER: [u8; 4] = [0x00, 0x00, 0xff, 0xff];

/// Compression of a single frame payload.
///
/// Accumulates the chunks of a [`DeflateStream`]. The last fragment of a message resolves with
/// the sync flush trailer removed, earlier fragments keep their output intact so that the
/// fragments of a message join into one deflate stream.
pub struct CompressJob {
    stream: DeflateStream,
    buffer: Vec<u8>,
    fin: bool,
}

impl CompressJob {
    pub fn new(stream: DeflateStream, fin: bool) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            fin,
        }
    }
}

impl Future for CompressJob {
    type Output = io::Result<Vec<u8>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            match self.stream.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => self.buffer.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(err))) => return Poll::Ready(Err(err)),
                Poll::Ready(None) => {
                    let compressed = take(&mut self.buffer);
                    return Poll::Ready(match self.fin {
                        true => trim_trailer(compressed),
                        false => Ok(compressed),
                    });
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Removes [`DEFLATE_TRAILER`] from the end of `compressed`. Output that does not end with
/// the trailer was not sync flushed and is rejected.
pub fn trim_trailer(mut compressed: Vec<u8>) -> io::Result<Vec<u8>> {
    if !compressed.ends_with(&DEFLATE_TRAILER) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "deflate output does not end with a sync flush",
        ));
    }
    compressed.truncate(compressed.len() - DEFLATE_TRAILER.len());
    Ok(compressed)
}
