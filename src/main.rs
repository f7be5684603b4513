use clap::Parser;
use qr_scan::{camera, cli, clipboard, config, decoder, error, interactive, report, scanner};
use camera::FfmpegCamera;
use cli::{Cli, Commands};
use clipboard::CommandClipboard;
use config::Config;
use error::Result;
use qr_scan_common::DecodedResult;
use scanner::Scanner;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    let clipboard = CommandClipboard::new(config.clipboard_command.clone());
    let build_scanner = |device: &str| {
        Scanner::new(
            FfmpegCamera::new(config.ffmpeg_path.clone(), device),
            decoder::build_decoder(&config, !cli.no_native),
            config.camera_request(),
        )
    };

    match cli.command {
        Commands::Scan { ref files, json, copy } => {
            let mut scanner = build_scanner(&config.camera_device);
            let mut found_count = 0;

            for (i, file) in files.iter().enumerate() {
                if files.len() > 1 {
                    println!("[{}/{}] {}", i + 1, files.len(), file.display());
                }
                if !file.exists() {
                    eprintln!("⚠ {}", error::QrScanError::FileNotFound(file.display().to_string()));
                    continue;
                }

                if scanner.upload(file).await {
                    found_count += 1;
                    if copy {
                        interactive::copy_result(&scanner, &clipboard);
                    }
                }
                report::print_state(scanner.state(), json)?;
            }

            if files.len() > 1 {
                println!("\n✅ {}/{}件 読み取り完了", found_count, files.len());
            }
        }

        Commands::Folder { ref folder, ref output, recursive } => {
            println!("🔍 qr-scan - フォルダスキャン\n");

            let images = scanner::scan_folder(folder, recursive)?;
            if images.is_empty() {
                return Err(error::QrScanError::NoImagesFound(folder.display().to_string()));
            }
            println!("✔ {}枚の画像を検出", images.len());

            let mut scanner = build_scanner(&config.camera_device);
            let entries = scanner::scan_images(&mut scanner, &images, true).await;
            let found = entries.iter().filter(|e| e.result.is_some()).count();

            let json = serde_json::to_string_pretty(&entries)?;
            match output {
                Some(path) => {
                    std::fs::write(path, json)?;
                    println!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }
            println!("\n✅ {}/{}件 読み取り完了", found, entries.len());
        }

        Commands::Camera { ref device, json, copy } => {
            let device = device.clone().unwrap_or_else(|| config.camera_device.clone());
            let mut scanner = build_scanner(&device);
            interactive::run_camera(&mut scanner, &clipboard, json, copy).await?;
        }

        Commands::Interactive => {
            let mut scanner = build_scanner(&config.camera_device);
            interactive::run_interactive(&mut scanner, &clipboard).await?;
        }

        Commands::Interpret { ref text } => {
            let result = DecodedResult::interpret(text.clone(), "input");
            print!("{}", report::render_result(&result));
        }

        Commands::Config { show, ref set_device, ref native_decoder } => {
            let mut config = config.clone();

            if let Some(device) = set_device {
                config.set_camera_device(device.clone())?;
                println!("✔ カメラデバイスを設定しました: {}", device);
            }

            if let Some(value) = native_decoder {
                let enabled = config::parse_bool(value).ok_or_else(|| {
                    error::QrScanError::Config(format!("true/false を指定してください: {}", value))
                })?;
                config.set_native_decoder(enabled)?;
                println!("✔ zbarimg の使用: {}", if enabled { "有効" } else { "無効" });
            }

            if show || (set_device.is_none() && native_decoder.is_none()) {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  カメラデバイス: {}", config.camera_device);
                println!("  解像度: {}x{}", config.frame_width, config.frame_height);
                println!("  カメラの向き: {}", config.facing.as_str());
                println!(
                    "  zbarimg: {} ({})",
                    if config.native_decoder { "有効" } else { "無効" },
                    config.zbarimg_path
                );
                println!("  ffmpeg: {}", config.ffmpeg_path);
            }
        }
    }

    Ok(())
}
