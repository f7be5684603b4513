//! QR Scan Common Library
//!
//! CLIとWeb(WASM)で共有されるスキャナの中核:
//! 状態遷移、デコーダ、ペイロード解釈、カメラセッション、アップロード検証

pub mod camera;
pub mod decoder;
pub mod error;
pub mod interpreter;
pub mod state;
pub mod types;
pub mod upload;

pub use camera::{CameraBackend, CameraPhase, CameraSession, CameraStream};
pub use decoder::{BundledDecoder, DecodeStrategy, Decoded, Decoder};
pub use error::{Result, ScanError};
pub use interpreter::{interpret, percent_decode};
pub use state::{DecodeTicket, ModeChange, ScannerState};
pub use types::{
    CameraRequest, DecodedResult, Facing, ParsedItem, PixelBuffer, PixelFormat, Preview, ScanMode,
};
pub use upload::{validate_image_type, ACCEPT_IMAGES};
