//! 対話式スキャン（ターミナルUI）

use crate::clipboard::Clipboard;
use crate::error::Result;
use crate::report::print_state;
use crate::scanner::Scanner;
use dialoguer::{Input, Select};
use qr_scan_common::{CameraBackend, ScanMode};
use std::path::PathBuf;

/// メニュー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// カメラでスキャン
    Camera,
    /// 画像ファイルをスキャン
    Upload,
    /// 結果をコピー
    Copy,
    /// エラーを閉じる
    Dismiss,
    /// 待機に戻す
    Reset,
    /// 終了
    Quit,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Camera => "📷 カメラでスキャン",
            MenuAction::Upload => "🖼 画像ファイルをスキャン",
            MenuAction::Copy => "📋 結果をコピー",
            MenuAction::Dismiss => "✖ メッセージを閉じる",
            MenuAction::Reset => "↺ リセット",
            MenuAction::Quit => "終了",
        }
    }
}

/// 現在の状態で選べる操作
pub fn available_actions<B: CameraBackend>(scanner: &Scanner<B>) -> Vec<MenuAction> {
    let state = scanner.state();
    let mut actions = vec![MenuAction::Camera, MenuAction::Upload];
    if state.result().is_some() {
        actions.push(MenuAction::Copy);
    }
    if state.error().is_some() {
        actions.push(MenuAction::Dismiss);
    }
    if state.mode() != ScanMode::Idle {
        actions.push(MenuAction::Reset);
    }
    actions.push(MenuAction::Quit);
    actions
}

/// カメラモード: 撮影／閉じる を繰り返す
///
/// QRコードが見つかるか閉じるまで続ける。
pub async fn run_camera<B: CameraBackend>(
    scanner: &mut Scanner<B>,
    clipboard: &dyn Clipboard,
    json: bool,
    copy: bool,
) -> Result<()> {
    println!("📷 カメラを起動中...");
    if !scanner.start_camera().await {
        print_state(scanner.state(), json)?;
        return Ok(());
    }
    println!("✔ カメラ起動。QRコードを映して「撮影」を選んでください\n");

    loop {
        let choice = Select::new()
            .with_prompt("操作")
            .items(&["撮影", "閉じる"])
            .default(0)
            .interact()?;

        if choice != 0 {
            scanner.close_camera();
            println!("カメラを閉じました");
            return Ok(());
        }

        let found = scanner.capture().await;
        print_state(scanner.state(), json)?;
        if found {
            if copy {
                copy_result(scanner, clipboard);
            }
            return Ok(());
        }
    }
}

/// 対話メニュー
pub async fn run_interactive<B: CameraBackend>(
    scanner: &mut Scanner<B>,
    clipboard: &dyn Clipboard,
) -> Result<()> {
    println!("🔍 qr-scan - 対話モード\n");

    let outcome = menu_loop(scanner, clipboard).await;
    // どの経路で抜けてもカメラを解放
    scanner.reset();
    outcome
}

async fn menu_loop<B: CameraBackend>(
    scanner: &mut Scanner<B>,
    clipboard: &dyn Clipboard,
) -> Result<()> {
    loop {
        println!("[{}]", scanner.mode().label());
        let actions = available_actions(scanner);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::new()
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice] {
            MenuAction::Camera => run_camera(scanner, clipboard, false, false).await?,
            MenuAction::Upload => {
                let path: String = Input::new()
                    .with_prompt("画像ファイルのパス")
                    .interact_text()?;
                let path = PathBuf::from(path.trim());
                println!("画像を解析中...");
                scanner.upload(&path).await;
                print_state(scanner.state(), false)?;
            }
            MenuAction::Copy => copy_result(scanner, clipboard),
            MenuAction::Dismiss => scanner.dismiss_error(),
            MenuAction::Reset => {
                scanner.reset();
            }
            MenuAction::Quit => return Ok(()),
        }
        println!();
    }
}

/// コピー失敗は表示のみ
pub fn copy_result<B: CameraBackend>(scanner: &Scanner<B>, clipboard: &dyn Clipboard) {
    match scanner.copy_result(clipboard) {
        Ok(()) => println!("✔ クリップボードにコピーしました"),
        Err(e) => eprintln!("⚠ {}", e),
    }
}
