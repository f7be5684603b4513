mod ffmpeg;

pub use ffmpeg::{FfmpegCamera, FfmpegStream};
