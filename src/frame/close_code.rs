/// Close code sent when a close frame carries a reason but no explicit code.
pub const NORMAL_CLOSURE: u16 = 1000;

// 1004, 1005, 1006 and 1015 are reserved and never sent on the wire.
pub fn is_valid_close_code(code: u16) -> bool {
    matches!(code, 1000..=1003 | 1007..=1011 | 3000..=4999)
}
