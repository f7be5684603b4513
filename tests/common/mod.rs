//! テスト共通ヘルパー

#![allow(dead_code)]

use async_trait::async_trait;
use image::GrayImage;
use qr_scan_common::{CameraBackend, CameraRequest, CameraStream, PixelBuffer, ScanError};
use qrcode::{Color, QrCode};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// QRコード画像（1モジュール=scale px、余白4モジュール）
pub fn qr_image(content: &str, scale: u32) -> GrayImage {
    let code = QrCode::new(content.as_bytes()).expect("QR生成失敗");
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let quiet = 4;
    let size = (modules + quiet * 2) * scale;

    GrayImage::from_fn(size, size, |x, y| {
        let mx = (x / scale) as i64 - quiet as i64;
        let my = (y / scale) as i64 - quiet as i64;
        let inside = mx >= 0 && my >= 0 && mx < modules as i64 && my < modules as i64;
        if inside && colors[(my as u32 * modules + mx as u32) as usize] == Color::Dark {
            image::Luma([0u8])
        } else {
            image::Luma([255u8])
        }
    })
}

pub fn qr_pixels(content: &str) -> PixelBuffer {
    let img = qr_image(content, 6);
    PixelBuffer::luma(img.width(), img.height(), img.into_raw()).expect("バッファ生成失敗")
}

pub fn blank_pixels(size: u32) -> PixelBuffer {
    PixelBuffer::luma(size, size, vec![255; (size * size) as usize]).expect("バッファ生成失敗")
}

/// QRコードのPNGを書き出す
pub fn write_qr_png(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    qr_image(content, 6).save(&path).expect("PNG保存失敗");
    path
}

/// 無地のPNGを書き出す
pub fn write_blank_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_pixel(120, 120, image::Luma([255u8]))
        .save(&path)
        .expect("PNG保存失敗");
    path
}

/// テスト用カメラ
///
/// `frame` を差し替えることで「映っているもの」を変えられる。
#[derive(Clone, Default)]
pub struct MockCamera {
    pub frame: Rc<RefCell<Option<PixelBuffer>>>,
    pub deny: bool,
    pub opens: Rc<Cell<usize>>,
    pub releases: Rc<Cell<usize>>,
}

impl MockCamera {
    pub fn showing(frame: PixelBuffer) -> Self {
        let camera = Self::default();
        camera.show(frame);
        camera
    }

    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    pub fn show(&self, frame: PixelBuffer) {
        *self.frame.borrow_mut() = Some(frame);
    }

    /// 開いたままのストリーム数
    pub fn open_streams(&self) -> usize {
        self.opens.get() - self.releases.get()
    }
}

pub struct MockStream {
    frame: Rc<RefCell<Option<PixelBuffer>>>,
    releases: Rc<Cell<usize>>,
    released: bool,
}

impl CameraStream for MockStream {
    fn grab_frame(&mut self) -> Option<PixelBuffer> {
        self.frame.borrow().clone()
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.releases.set(self.releases.get() + 1);
        }
    }
}

#[async_trait(?Send)]
impl CameraBackend for MockCamera {
    type Stream = MockStream;

    async fn open(&self, _request: &CameraRequest) -> qr_scan_common::Result<MockStream> {
        if self.deny {
            return Err(ScanError::PermissionDenied("NotAllowedError".into()));
        }
        self.opens.set(self.opens.get() + 1);
        Ok(MockStream {
            frame: self.frame.clone(),
            releases: self.releases.clone(),
            released: false,
        })
    }
}
