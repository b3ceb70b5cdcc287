use crate::connection::{Completion, WsSendError};
use crate::deflate::{CompressJob, PerMessageDeflate};
use crate::frame::{gen_mask, EncodedFrame, FrameHead, Opcode, Payload};
use futures::future::FutureExt;
use futures::io::AsyncWrite;
use rand::RngCore;
use std::io;
use std::mem::take;
use std::task::{Context, Poll};

pub(crate) enum OutboundState {
    // compression starts once the entry reaches the head of the queue
    Uncompressed(Payload),
    Compressing(CompressJob),
    Writing(EncodedFrame),
}

/// One queued frame, from submission until it has been written or has failed.
pub(crate) struct Outbound {
    head: FrameHead,
    state: OutboundState,
    message: Option<u64>,
    pub(crate) completion: Option<Completion>,
}

impl Outbound {
    pub(crate) fn ready<R: RngCore>(
        mut head: FrameHead,
        payload: Payload,
        rng: &mut R,
        merge_threshold: usize,
        message: Option<u64>,
        completion: Option<Completion>,
    ) -> Self {
        head.mask = head.mask.map(|_| gen_mask(rng));
        Self {
            head,
            state: OutboundState::Writing(EncodedFrame::new(head, payload, merge_threshold)),
            message,
            completion,
        }
    }
    pub(crate) fn compressed(
        head: FrameHead,
        payload: Payload,
        message: u64,
        completion: Option<Completion>,
    ) -> Self {
        Self {
            head,
            state: OutboundState::Uncompressed(payload),
            message: Some(message),
            completion,
        }
    }
    pub(crate) fn opcode(&self) -> Opcode {
        self.head.opcode
    }
    /// Data message this frame belongs to, `None` for control frames.
    pub(crate) fn message(&self) -> Option<u64> {
        self.message
    }
    pub(crate) fn fin(&self) -> bool {
        self.head.fin
    }
    /// Drives compression and then writing. Ready once the whole frame reached the transport.
    pub(crate) fn poll<T: AsyncWrite + Unpin, R: RngCore>(
        &mut self,
        transport: &mut T,
        rng: &mut R,
        mut deflate: Option<&mut PerMessageDeflate>,
        merge_threshold: usize,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), WsSendError>> {
        loop {
            match &mut self.state {
                OutboundState::Uncompressed(payload) => match deflate.take() {
                    Some(deflate) => {
                        let job = deflate.start(take(payload).as_slice(), self.head.fin);
                        self.state = OutboundState::Compressing(job);
                    }
                    None => {
                        return Poll::Ready(Err(WsSendError::Compression(io::Error::new(
                            io::ErrorKind::Other,
                            "permessage-deflate is not in use",
                        ))))
                    }
                },
                OutboundState::Compressing(job) => match job.poll_unpin(cx) {
                    Poll::Ready(Ok(compressed)) => {
                        log::trace!(
                            "compressed {} frame to {} bytes",
                            <&str>::from(self.head.opcode),
                            compressed.len()
                        );
                        self.head.mask = self.head.mask.map(|_| gen_mask(rng));
                        let frame =
                            EncodedFrame::new(self.head, Payload::from(compressed), merge_threshold);
                        self.state = OutboundState::Writing(frame);
                    }
                    Poll::Ready(Err(err)) => return Poll::Ready(Err(WsSendError::Compression(err))),
                    Poll::Pending => return Poll::Pending,
                },
                OutboundState::Writing(frame) => {
                    return match frame.poll_write(transport, cx) {
                        Poll::Ready(Ok(())) => {
                            log::trace!(
                                "wrote {} frame, {} bytes in {} writes",
                                <&str>::from(self.head.opcode),
                                frame.len_bytes(),
                                frame.writes().len()
                            );
                            Poll::Ready(Ok(()))
                        }
                        Poll::Ready(Err(err)) => Poll::Ready(Err(WsSendError::Transport(err))),
                        Poll::Pending => Poll::Pending,
                    }
                }
            }
        }
    }
}
