use bytes::Bytes;

/// Frame payload handed to the sender.
///
/// `Owned` buffers belong to the sender once submitted and may be masked in place. `Shared`
/// buffers are never written to, so masking one always copies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Owned(Vec<u8>),
    Shared(Bytes),
}

impl Payload {
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn is_shared(&self) -> bool {
        matches!(self, Payload::Shared(_))
    }
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Payload::Owned(vec) => vec,
            Payload::Shared(bytes) => bytes,
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Owned(Vec::new())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(vec: Vec<u8>) -> Self {
        Payload::Owned(vec)
    }
}

impl From<String> for Payload {
    fn from(string: String) -> Self {
        Payload::Owned(string.into_bytes())
    }
}

impl From<&str> for Payload {
    fn from(str: &str) -> Self {
        Payload::Owned(str.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Payload {
    fn from(slice: &[u8]) -> Self {
        Payload::Owned(slice.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(array: &[u8; N]) -> Self {
        Payload::Owned(array.to_vec())
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Shared(bytes)
    }
}
