use futures::channel::oneshot;
use std::io;

#[derive(thiserror::Error, Debug)]
pub enum WsSendError {
    #[error("invalid close code: {0}")]
    InvalidCloseCode(u16),
    #[error("control frame payload of {0} bytes exceeds 125 bytes")]
    ControlPayloadTooLarge(usize),
    #[error("io error: {0}")]
    Transport(#[from] io::Error),
    #[error("compression error: {0}")]
    Compression(io::Error),
    #[error("message abandoned after an earlier fragment failed to compress")]
    MessageAborted,
}

/// Called once the frame of a send was written, or with the error that prevented it.
pub type Completion = Box<dyn FnOnce(Result<(), WsSendError>) + Send>;

/// Receives failures of sends submitted without a [`Completion`].
pub type ErrorObserver = Box<dyn FnMut(WsSendError) + Send>;

/// A [`Completion`] that forwards its result to the returned receiver.
pub fn completion() -> (Completion, oneshot::Receiver<Result<(), WsSendError>>) {
    let (sender, receiver) = oneshot::channel();
    let completion: Completion = Box::new(move |result| {
        // The receiver may be gone, nobody is waiting for the result then.
        let _ = sender.send(result);
    });
    (completion, receiver)
}

pub(crate) fn log_errors() -> ErrorObserver {
    Box::new(|err| log::error!("websocket send failed: {}", err))
}

pub(crate) fn broken_pipe() -> WsSendError {
    WsSendError::Transport(io::ErrorKind::BrokenPipe.into())
}

pub(crate) fn report(
    on_error: &mut ErrorObserver,
    completion: Option<Completion>,
    result: Result<(), WsSendError>,
) {
    match (completion, result) {
        (Some(completion), result) => completion(result),
        (None, Err(err)) => on_error(err),
        (None, Ok(())) => {}
    }
}
