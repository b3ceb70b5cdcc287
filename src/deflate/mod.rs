//! permessage-deflate (RFC 7692) compression of outgoing messages.

mod job;

pub use job::*;

use flate2::{Compress, Compression, FlushCompress, Status};
use futures::stream::{self, BoxStream, StreamExt};
use std::io;

const CHUNK_LEN: usize = 1024;

pub type DeflateStream = BoxStream<'static, io::Result<Vec<u8>>>;

/// Raw deflate compressor. Every call ends in a sync flush, so the output ends in the empty
/// stored block `00 00 ff ff`, and the context carries over to the next call until `reset`.
pub trait Deflate: Send {
    fn deflate(&mut self, payload: &[u8]) -> DeflateStream;
    fn reset(&mut self);
}

#[derive(Copy, Clone, Debug)]
pub struct DeflateConfig {
    pub level: u32,
    pub no_context_takeover: bool,
    // messages whose first fragment is shorter go out uncompressed
    pub threshold: usize,
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self {
            level: 6,
            no_context_takeover: false,
            threshold: 0,
        }
    }
}

pub struct FlateDeflate {
    compress: Compress,
}

impl FlateDeflate {
    pub fn new(level: u32) -> Self {
        Self {
            compress: Compress::new(Compression::new(level.min(9)), false),
        }
    }
    fn run(&mut self, mut input: &[u8]) -> io::Result<Vec<Vec<u8>>> {
        let mut chunks = Vec::new();
        loop {
            let mut chunk = Vec::with_capacity(CHUNK_LEN);
            let before_in = self.compress.total_in();
            let status = self
                .compress
                .compress_vec(input, &mut chunk, FlushCompress::Sync)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            input = &input[(self.compress.total_in() - before_in) as usize..];
            let filled = chunk.len() == chunk.capacity();
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
            match status {
                Status::Ok | Status::BufError => {}
                Status::StreamEnd => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "deflate stream ended unexpectedly",
                    ))
                }
            }
            // The flush is complete once the output stopped short of filling the chunk.
            if input.is_empty() && !filled {
                return Ok(chunks);
            }
        }
    }
}

impl Deflate for FlateDeflate {
    fn deflate(&mut self, payload: &[u8]) -> DeflateStream {
        match self.run(payload) {
            Ok(chunks) => stream::iter(chunks.into_iter().map(Ok)).boxed(),
            Err(err) => stream::once(async move { Err::<Vec<u8>, _>(err) }).boxed(),
        }
    }
    fn reset(&mut self) {
        self.compress.reset();
    }
}

pub struct PerMessageDeflate {
    config: DeflateConfig,
    deflate: Box<dyn Deflate>,
}

impl PerMessageDeflate {
    pub fn new(config: DeflateConfig) -> Self {
        Self::with_deflate(config, Box::new(FlateDeflate::new(config.level)))
    }
    pub fn with_deflate(config: DeflateConfig, deflate: Box<dyn Deflate>) -> Self {
        Self { config, deflate }
    }
    pub fn config(&self) -> &DeflateConfig {
        &self.config
    }
    pub fn accepts(&self, len: usize) -> bool {
        len >= self.config.threshold
    }
    /// Starts compressing one fragment. All fragments of a message form a single deflate
    /// stream, only the last one (`fin`) loses the sync flush trailer.
    pub fn start(&mut self, payload: &[u8], fin: bool) -> CompressJob {
        let job = CompressJob::new(self.deflate.deflate(payload), fin);
        if fin && self.config.no_context_takeover {
            self.deflate.reset();
        }
        job
    }
    pub fn reset(&mut self) {
        self.deflate.reset();
    }
}
