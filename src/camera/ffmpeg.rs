//! ffmpeg経由のカメラ（Linux v4l2）
//!
//! ffmpeg にグレースケールの生フレームを標準出力へ書かせ、読み取りタスクが
//! 最新フレームを watch チャネルに流す。最初のフレームが届いた時点で起動成功とみなす。

use async_trait::async_trait;
use qr_scan_common::{CameraBackend, CameraRequest, CameraStream, PixelBuffer, ScanError};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct FfmpegCamera {
    program: String,
    device: String,
}

impl FfmpegCamera {
    pub fn new(program: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            device: device.into(),
        }
    }

    fn args(&self, request: &CameraRequest) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "v4l2".into(),
            "-video_size".into(),
            format!("{}x{}", request.width, request.height),
            "-i".into(),
            self.device.clone(),
            "-vf".into(),
            format!("scale={}:{},format=gray", request.width, request.height),
            "-pix_fmt".into(),
            "gray".into(),
            "-f".into(),
            "rawvideo".into(),
            "-".into(),
        ]
    }

    fn denied(&self, reason: impl std::fmt::Display) -> ScanError {
        ScanError::PermissionDenied(format!("{}: {}", self.device, reason))
    }
}

#[async_trait(?Send)]
impl CameraBackend for FfmpegCamera {
    type Stream = FfmpegStream;

    async fn open(&self, request: &CameraRequest) -> qr_scan_common::Result<FfmpegStream> {
        tokio::fs::metadata(&self.device)
            .await
            .map_err(|e| self.denied(e))?;
        debug!(
            "v4l2 ではカメラの向き({})を選べないため {} を使用",
            request.facing.as_str(),
            self.device
        );

        let mut child = Command::new(&self.program)
            .args(self.args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.denied(format!("{} 実行エラー: {}", self.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.denied("標準出力を取得できません"))?;
        let mut reader = BufReader::new(stdout);

        let frame_len = request.width as usize * request.height as usize;
        let mut first = vec![0u8; frame_len];
        if let Err(e) = reader.read_exact(&mut first).await {
            let stderr = read_stderr(&mut child).await;
            let _ = child.kill().await;
            return Err(self.denied(if stderr.is_empty() { e.to_string() } else { stderr }));
        }

        let first = PixelBuffer::luma(request.width, request.height, first)?;
        let (tx, frames) = watch::channel(Some(first));
        let reader = tokio::spawn(read_frames(reader, tx, request.width, request.height));
        // パイプが詰まると ffmpeg が止まるため、起動後の stderr は読み捨てる
        let stderr = child.stderr.take().map(|stderr| tokio::spawn(drain_stderr(stderr)));

        Ok(FfmpegStream {
            child,
            reader,
            stderr,
            frames,
            released: false,
        })
    }
}

async fn read_stderr(child: &mut Child) -> String {
    let mut text = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_string(&mut text).await;
    }
    text.trim().to_string()
}

/// stderr を行単位で読み、debug ログに流す
///
/// # Returns
/// 読んだ行数
async fn drain_stderr<R>(stderr: R) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    let mut count = 0;
    while let Ok(Some(line)) = lines.next_line().await {
        debug!("ffmpeg: {}", line);
        count += 1;
    }
    count
}

/// 固定長フレームを読み続け、最新フレームを公開する
async fn read_frames<R>(
    mut reader: R,
    tx: watch::Sender<Option<PixelBuffer>>,
    width: u32,
    height: u32,
) where
    R: AsyncRead + Unpin,
{
    let frame_len = width as usize * height as usize;
    loop {
        let mut data = vec![0u8; frame_len];
        if let Err(e) = reader.read_exact(&mut data).await {
            debug!("フレーム読み取り終了: {}", e);
            break;
        }
        let frame = match PixelBuffer::luma(width, height, data) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("フレーム破棄: {}", e);
                continue;
            }
        };
        if tx.send(Some(frame)).is_err() {
            break;
        }
    }
}

pub struct FfmpegStream {
    child: Child,
    reader: JoinHandle<()>,
    stderr: Option<JoinHandle<usize>>,
    frames: watch::Receiver<Option<PixelBuffer>>,
    released: bool,
}

impl CameraStream for FfmpegStream {
    fn grab_frame(&mut self) -> Option<PixelBuffer> {
        self.frames.borrow_and_update().clone()
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.reader.abort();
        if let Some(stderr) = &self.stderr {
            stderr.abort();
        }
        if let Err(e) = self.child.start_kill() {
            debug!("ffmpeg は終了済み: {}", e);
        }
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.release();
    }
}
