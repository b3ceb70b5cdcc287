mod config;
mod encode;
mod error;
mod write_state;

pub use config::*;
pub use error::*;
pub use write_state::MessageState;

use crate::connection::encode::Outbound;
use crate::deflate::{Deflate, DeflateConfig, PerMessageDeflate};
use crate::frame::{
    is_valid_close_code, FrameHead, Payload, WsControlFrameKind, WsDataFrameKind,
    MAX_CONTROL_PAYLOAD_LEN, NORMAL_CLOSURE,
};
use futures::io::AsyncWrite;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

pub struct SendOptions {
    pub fin: bool,
    // overrides WsConfig::mask for this frame
    pub mask: Option<bool>,
    pub binary: bool,
    pub compress: bool,
    pub completion: Option<Completion>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            fin: true,
            mask: None,
            binary: false,
            compress: false,
            completion: None,
        }
    }
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn fin(mut self, fin: bool) -> Self {
        self.fin = fin;
        self
    }
    pub fn mask(mut self, mask: bool) -> Self {
        self.mask = Some(mask);
        self
    }
    pub fn binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
    pub fn on_complete(mut self, completion: Completion) -> Self {
        self.completion = Some(completion);
        self
    }
}

/// Options of a ping, pong or close frame. Control frames are always final and never
/// compressed.
#[derive(Default)]
pub struct ControlOptions {
    pub mask: Option<bool>,
    pub completion: Option<Completion>,
}

impl ControlOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn mask(mut self, mask: bool) -> Self {
        self.mask = Some(mask);
        self
    }
    pub fn on_complete(mut self, completion: Completion) -> Self {
        self.completion = Some(completion);
        self
    }
}

/// Sending half of a websocket connection.
///
/// [`send`](Self::send), [`ping`](Self::ping), [`pong`](Self::pong) and
/// [`close`](Self::close) queue a frame and return immediately. The queue is written to the
/// transport strictly in submission order by [`poll_flush`](Self::poll_flush) or
/// [`flush`](Self::flush); a frame still being compressed holds back every frame queued after
/// it.
///
/// The outcome of each frame goes to the completion of its send, if one was given, and
/// otherwise, for failures only, to the error observer (see [`on_error`](Self::on_error)).
/// Once a write fails every remaining and future frame fails with a broken pipe error.
///
/// A fragment that fails to compress abandons its message. If nothing of the message was
/// written yet, its remaining fragments fail with [`WsSendError::MessageAborted`]. Otherwise
/// the peer already holds an unfinished message and the sender fails as if a write had failed.
pub struct WsSender<T: AsyncWrite + Unpin, R: RngCore = StdRng> {
    transport: T,
    config: WsConfig,
    mask_rng: R,
    message: MessageState,
    message_id: u64,
    deflate: Option<PerMessageDeflate>,
    queue: VecDeque<Outbound>,
    // message with fragments on the wire but no final fragment yet
    written_open: Option<u64>,
    aborted: Option<u64>,
    flushed: bool,
    failed: bool,
    on_error: ErrorObserver,
}

impl<T: AsyncWrite + Unpin> WsSender<T, StdRng> {
    pub fn with_config(transport: T, config: WsConfig) -> Self {
        Self::with_rng(transport, config, StdRng::from_entropy())
    }
    pub fn client(transport: T) -> Self {
        Self::with_config(transport, WsConfig::client())
    }
    pub fn server(transport: T) -> Self {
        Self::with_config(transport, WsConfig::server())
    }
}

impl<T: AsyncWrite + Unpin, R: RngCore> WsSender<T, R> {
    pub fn with_rng(transport: T, config: WsConfig, mask_rng: R) -> Self {
        let deflate = config.deflate.map(PerMessageDeflate::new);
        Self {
            transport,
            config,
            mask_rng,
            message: MessageState::default(),
            message_id: 0,
            deflate,
            queue: VecDeque::new(),
            written_open: None,
            aborted: None,
            flushed: true,
            failed: false,
            on_error: log_errors(),
        }
    }
    pub fn set_deflate(&mut self, config: DeflateConfig, deflate: Box<dyn Deflate>) {
        self.config.deflate = Some(config);
        self.deflate = Some(PerMessageDeflate::with_deflate(config, deflate));
    }
    /// Replaces the observer of failed sends that have no completion. By default failures are
    /// logged.
    pub fn on_error(&mut self, observer: impl FnMut(WsSendError) + Send + 'static) {
        self.on_error = Box::new(observer);
    }
    pub fn config(&self) -> &WsConfig {
        &self.config
    }
    pub fn message_state(&self) -> MessageState {
        self.message
    }
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
    pub fn get_ref(&self) -> &T {
        &self.transport
    }
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Queues a text or binary data frame.
    ///
    /// The first frame of a message carries the text or binary opcode, later fragments the
    /// continuation opcode regardless of `binary`. `fin = false` leaves the message open for
    /// further fragments. Compression is decided by the first fragment and ignored if
    /// permessage-deflate is not in use.
    pub fn send(&mut self, data: impl Into<Payload>, options: SendOptions) {
        let payload = data.into();
        let kind = match options.binary {
            true => WsDataFrameKind::Binary,
            false => WsDataFrameKind::Text,
        };
        let compress = match (&self.deflate, options.compress) {
            (Some(deflate), true) => deflate.accepts(payload.len()),
            (None, true) => {
                log::debug!("permessage-deflate not negotiated, sending uncompressed");
                false
            }
            (_, false) => false,
        };
        if self.message.is_message_start() {
            self.message_id += 1;
        }
        let fields = self.message.advance(kind, options.fin, compress);
        log::debug!(
            "{} frame, fin: {}, compressed: {}, next: {:?}",
            <&str>::from(fields.opcode),
            options.fin,
            fields.compressed,
            self.message
        );
        let head = FrameHead {
            fin: options.fin,
            rsv1: fields.rsv1,
            opcode: fields.opcode,
            mask: self.mask_placeholder(options.mask),
            payload_len: payload.len() as u64,
        };
        let outbound = match fields.compressed {
            true => Outbound::compressed(head, payload, self.message_id, options.completion),
            false => Outbound::ready(
                head,
                payload,
                &mut self.mask_rng,
                self.config.merge_threshold,
                Some(self.message_id),
                options.completion,
            ),
        };
        self.queue.push_back(outbound);
    }

    pub fn ping(
        &mut self,
        data: impl Into<Payload>,
        options: ControlOptions,
    ) -> Result<(), WsSendError> {
        self.send_control(WsControlFrameKind::Ping, data.into(), options)
    }

    pub fn pong(
        &mut self,
        data: impl Into<Payload>,
        options: ControlOptions,
    ) -> Result<(), WsSendError> {
        self.send_control(WsControlFrameKind::Pong, data.into(), options)
    }

    /// Queues a close frame.
    ///
    /// Without code and reason the frame is empty. Otherwise the payload is the big endian
    /// code, 1000 if only a reason is given, followed by the UTF-8 reason. Fails immediately,
    /// without queueing anything, on a code that may not be sent or a payload over 125 bytes.
    pub fn close(
        &mut self,
        code: Option<u16>,
        reason: Option<&str>,
        options: ControlOptions,
    ) -> Result<(), WsSendError> {
        if let Some(code) = code.filter(|&code| !is_valid_close_code(code)) {
            return Err(WsSendError::InvalidCloseCode(code));
        }
        let payload = match (code, reason) {
            (None, None) => Vec::new(),
            (code, reason) => {
                let reason = reason.unwrap_or_default().as_bytes();
                let mut payload = Vec::with_capacity(2 + reason.len());
                payload.extend_from_slice(&code.unwrap_or(NORMAL_CLOSURE).to_be_bytes());
                payload.extend_from_slice(reason);
                payload
            }
        };
        self.send_control(WsControlFrameKind::Close, payload.into(), options)
    }

    fn send_control(
        &mut self,
        kind: WsControlFrameKind,
        payload: Payload,
        options: ControlOptions,
    ) -> Result<(), WsSendError> {
        if payload.len() > MAX_CONTROL_PAYLOAD_LEN {
            return Err(WsSendError::ControlPayloadTooLarge(payload.len()));
        }
        let head = FrameHead {
            fin: true,
            rsv1: false,
            opcode: kind.opcode(),
            mask: self.mask_placeholder(options.mask),
            payload_len: payload.len() as u64,
        };
        let outbound = Outbound::ready(
            head,
            payload,
            &mut self.mask_rng,
            self.config.merge_threshold,
            None,
            options.completion,
        );
        self.queue.push_back(outbound);
        Ok(())
    }

    // The key itself is drawn when the frame is encoded.
    fn mask_placeholder(&self, mask: Option<bool>) -> Option<[u8; 4]> {
        match mask.unwrap_or(self.config.mask) {
            true => Some([0u8; 4]),
            false => None,
        }
    }

    /// Writes queued frames in order and flushes the transport. Results go to completions and
    /// the error observer.
    pub fn poll_flush(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        while let Some(outbound) = self.queue.front_mut() {
            let result = if self.failed {
                Err(broken_pipe())
            } else if outbound.message().is_some() && outbound.message() == self.aborted {
                Err(WsSendError::MessageAborted)
            } else {
                match outbound.poll(
                    &mut self.transport,
                    &mut self.mask_rng,
                    self.deflate.as_mut(),
                    self.config.merge_threshold,
                    cx,
                ) {
                    Poll::Ready(result) => result,
                    Poll::Pending => return Poll::Pending,
                }
            };
            let outbound = match self.queue.pop_front() {
                Some(outbound) => outbound,
                None => break,
            };
            match &result {
                Ok(()) => {
                    self.flushed = false;
                    if let Some(message) = outbound.message() {
                        self.written_open = Some(message).filter(|_| !outbound.fin());
                    }
                }
                Err(WsSendError::Transport(err)) if !self.failed => {
                    log::debug!(
                        "write of {} frame failed: {}",
                        <&str>::from(outbound.opcode()),
                        err
                    );
                    self.failed = true;
                }
                Err(WsSendError::Compression(err)) => self.abandon(&outbound, err),
                Err(_) => {}
            }
            report(&mut self.on_error, outbound.completion, result);
        }
        if !self.failed && !self.flushed {
            match Pin::new(&mut self.transport).poll_flush(cx) {
                Poll::Ready(Ok(())) => self.flushed = true,
                Poll::Ready(Err(err)) => {
                    self.failed = true;
                    (self.on_error)(WsSendError::Transport(err));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
        Poll::Ready(())
    }

    // The compression context is unknown after a failure, the next message starts afresh.
    fn abandon(&mut self, outbound: &Outbound, err: &std::io::Error) {
        if let Some(deflate) = self.deflate.as_mut() {
            deflate.reset();
        }
        let message = match outbound.message() {
            Some(message) => message,
            None => return,
        };
        if self.written_open == Some(message) {
            log::debug!("message {} cut short by compression failure: {}", message, err);
            self.failed = true;
        } else if !outbound.fin() {
            self.aborted = Some(message);
        }
    }

    pub async fn flush(&mut self) {
        futures_lite::future::poll_fn(|cx| self.poll_flush(cx)).await
    }

    /// Whether the sender stopped writing, after a failed write or a message it could not
    /// finish.
    pub fn is_failed(&self) -> bool {
        self.failed
    }
}
