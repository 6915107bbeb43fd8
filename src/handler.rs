//! # 命令处理逻辑模块
//!
//! 包含处理 `hide` 和 `recover` 子命令的高级业务逻辑。
//! 本模块负责覆盖保护、确定输出路径、调用载体调度器以及向用户报告结果。

use crate::bitmap;
use crate::cli::{HideArgs, RecoverArgs};
use crate::dispatch::{self, CarrierKind};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责确定输出路径、执行覆盖保护检查、调用调度器完成编码，
/// 并向用户报告新载体的位置与标识。
///
/// # Arguments
///
/// * `args` - 包含载体、秘密文本、密码与输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标路径已存在且未指定 `--force`。
/// * 秘密文本为空，或载体无法解码。
/// * 载体的容量不足以容纳载荷。
/// * 无法持久化编码结果。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args.dest.clone().unwrap_or_else(|| default_dest(&args.carrier));

    ensure_writable(&dest, args.force)?;

    let outcome = dispatch::encode(
        &args.carrier,
        &args.secret,
        args.password.as_deref(),
        Some(dest.as_path()),
    )
    .with_context(|| {
        format!(
            "Unable to hide the secret in carrier: {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The secret has been successfully hidden and saved: {} (id: {})",
        outcome.uri.to_string_lossy().green().bold(),
        outcome.id.cyan()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责调用调度器恢复秘密文本，并按需打印到标准输出或写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含载体、密码与文本输出路径的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 载体无法解码，或其中没有可辨认的隐藏比特流。
/// * 信封携带的密码与提供的不一致。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let secret = dispatch::decode(&args.carrier, args.password.as_deref()).with_context(|| {
        format!(
            "Unable to recover a secret from carrier: {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;

    match &args.text {
        Some(path) => {
            ensure_writable(path, args.force)?;
            fs::write(path, &secret).with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    path.to_string_lossy().red().bold()
                )
            })?;
            println!(
                "The secret has been successfully recovered and saved: {}",
                path.to_string_lossy().green().bold()
            );
        }
        None => println!("{secret}"),
    }

    Ok(())
}

/// 为载体派生默认输出路径。分类失败时先按图像处理，
/// 让调度器随后报出更具体的错误。
fn default_dest(carrier: &Path) -> PathBuf {
    match CarrierKind::classify(carrier) {
        Ok(CarrierKind::FrameSequence) => dispatch::default_sequence_output(carrier),
        _ => bitmap::default_output(carrier),
    }
}

/// 覆盖保护：目标已存在且未指定 `--force` 时拒绝执行；
/// 指定了 `--force` 则先移除旧输出，给原子发布腾出位置。
fn ensure_writable(dest: &Path, force: bool) -> Result<()> {
    if dest.exists() {
        anyhow::ensure!(
            force,
            "Output file already exists: {}. \nUse --force to overwrite it.",
            dest.to_string_lossy().red().bold()
        );
        let removal = if dest.is_dir() {
            fs::remove_dir_all(dest)
        } else {
            fs::remove_file(dest)
        };
        removal.with_context(|| {
            format!(
                "Unable to replace the existing output: {}",
                dest.to_string_lossy().red().bold()
            )
        })?;
    }
    Ok(())
}
