mod close_code;
mod encode;
mod frame_head;
mod mask;
mod payload;

pub use close_code::*;
pub use encode::*;
pub use frame_head::*;
pub use mask::*;
pub use payload::*;

/// Largest payload a ping, pong or close frame may carry.
pub const MAX_CONTROL_PAYLOAD_LEN: usize = 125;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::IntoStaticStr, strum::EnumIter)]
pub enum Opcode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn bits(self) -> u8 {
        match self {
            Opcode::Continuation => 0x0,
            Opcode::Text => 0x1,
            Opcode::Binary => 0x2,
            Opcode::Close => 0x8,
            Opcode::Ping => 0x9,
            Opcode::Pong => 0xA,
        }
    }
    pub fn is_control(self) -> bool {
        self.bits() & 0x8 != 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WsDataFrameKind {
    Text,
    Binary,
}

impl WsDataFrameKind {
    pub fn opcode(self) -> Opcode {
        match self {
            WsDataFrameKind::Text => Opcode::Text,
            WsDataFrameKind::Binary => Opcode::Binary,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WsControlFrameKind {
    Ping,
    Pong,
    Close,
}

impl WsControlFrameKind {
    pub fn opcode(self) -> Opcode {
        match self {
            WsControlFrameKind::Ping => Opcode::Ping,
            WsControlFrameKind::Pong => Opcode::Pong,
            WsControlFrameKind::Close => Opcode::Close,
        }
    }
}
