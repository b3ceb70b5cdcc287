use crate::deflate::DeflateConfig;
use crate::frame::DEFAULT_MERGE_THRESHOLD;

pub struct WsConfig {
    pub mask: bool,
    pub merge_threshold: usize,
    pub deflate: Option<DeflateConfig>,
    _private: (),
}

impl WsConfig {
    pub fn client() -> Self {
        Self {
            mask: true,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            deflate: None,
            _private: (),
        }
    }
    pub fn server() -> Self {
        Self {
            mask: false,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            deflate: None,
            _private: (),
        }
    }
    pub fn with_deflate(mut self, deflate: DeflateConfig) -> Self {
        self.deflate = Some(deflate);
        self
    }
}
