use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qr-scan")]
#[command(about = "QRコードスキャナ（カメラ・画像ファイル対応）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// zbarimg を使わず同梱デコーダのみ使用
    #[arg(long, global = true)]
    pub no_native: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像ファイルのQRコードを読み取る
    Scan {
        /// 画像ファイル（複数可）
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// JSONで出力
        #[arg(long)]
        json: bool,

        /// 読み取ったテキストをクリップボードにコピー
        #[arg(long)]
        copy: bool,
    },

    /// フォルダ内の画像をまとめて読み取る
    Folder {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// カメラでQRコードを読み取る
    Camera {
        /// カメラデバイス（省略時は設定値）
        #[arg(short, long)]
        device: Option<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,

        /// 読み取ったテキストをクリップボードにコピー
        #[arg(long)]
        copy: bool,
    },

    /// 対話モード（カメラ／画像を切り替えながらスキャン）
    Interactive,

    /// テキストをペイロードとして解釈
    Interpret {
        /// デコード済みテキスト
        #[arg(required = true)]
        text: String,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// カメラデバイスを設定
        #[arg(long)]
        set_device: Option<String>,

        /// zbarimg の使用を設定 (true/false)
        #[arg(long)]
        native_decoder: Option<String>,
    },
}
