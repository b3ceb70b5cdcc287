use crate::frame::{Opcode, WsDataFrameKind};

/// Position inside the outgoing data message. Control frames leave it untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageState {
    MessageStart,
    MessageMid { compressed: bool },
}

impl Default for MessageState {
    fn default() -> Self {
        MessageState::MessageStart
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct DataFrameFields {
    pub opcode: Opcode,
    pub rsv1: bool,
    pub compressed: bool,
}

impl MessageState {
    // `compress` only counts at message start, continuations never carry RSV1
    pub(crate) fn advance(
        &mut self,
        kind: WsDataFrameKind,
        fin: bool,
        compress: bool,
    ) -> DataFrameFields {
        let fields = match *self {
            MessageState::MessageStart => DataFrameFields {
                opcode: kind.opcode(),
                rsv1: compress,
                compressed: compress,
            },
            MessageState::MessageMid { compressed } => DataFrameFields {
                opcode: Opcode::Continuation,
                rsv1: false,
                compressed,
            },
        };
        *self = match fin {
            true => MessageState::MessageStart,
            false => MessageState::MessageMid {
                compressed: fields.compressed,
            },
        };
        fields
    }
    pub fn is_message_start(&self) -> bool {
        *self == MessageState::MessageStart
    }
}
