//! クリップボード書き込み
//!
//! 外部コマンド（wl-copy / xclip / xsel / pbcopy / clip）の標準入力に書き込む。

use crate::error::{QrScanError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// 外部コマンドによるクリップボード
pub struct CommandClipboard {
    candidates: Vec<Vec<String>>,
}

impl CommandClipboard {
    /// 候補コマンドを自動で並べる（設定値があれば最優先）
    pub fn new(configured: Option<Vec<String>>) -> Self {
        let mut candidates: Vec<Vec<String>> = configured.into_iter().collect();
        for cmd in DEFAULT_COMMANDS {
            candidates.push(cmd.iter().map(|s| s.to_string()).collect());
        }
        Self { candidates }
    }

    fn run(command: &[String], text: &str) -> std::io::Result<bool> {
        let (program, args) = match command.split_first() {
            Some(parts) => parts,
            None => return Ok(false),
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        Ok(child.wait()?.success())
    }
}

#[cfg(target_os = "macos")]
const DEFAULT_COMMANDS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(windows)]
const DEFAULT_COMMANDS: &[&[&str]] = &[&["clip"]];

#[cfg(not(any(target_os = "macos", windows)))]
const DEFAULT_COMMANDS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

impl Clipboard for CommandClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut last_error = String::from("利用可能なコマンドがありません");

        for command in &self.candidates {
            match Self::run(command, text) {
                Ok(true) => {
                    debug!("クリップボードにコピー: {}", command.join(" "));
                    return Ok(());
                }
                Ok(false) => last_error = format!("{} が失敗しました", command.join(" ")),
                Err(e) => {
                    debug!("{} を使用できません: {}", command.join(" "), e);
                    last_error = e.to_string();
                }
            }
        }

        Err(QrScanError::Clipboard(last_error))
    }
}
