//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损载体 (如 PNG, BMP 图像或无损帧序列目录) 中隐藏或恢复秘密文本。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在无损载体 (如 PNG, BMP 图像或无损帧序列目录) 中隐藏或恢复秘密文本。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏) 和 recover (恢复)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在无损载体中隐藏秘密文本。
    Hide(HideArgs),

    /// 从经过隐写的载体中恢复秘密文本。
    Recover(RecoverArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 载体路径：无损图像 (如 PNG, BMP)，或由无损帧组成的目录。
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// 要隐藏的秘密文本。
    #[arg(short, long)]
    pub secret: String,

    /// 可选密码；恢复时必须提供相同的密码。
    #[arg(short, long)]
    pub password: Option<String>,

    /// 编码结果的输出路径；缺省时在载体旁派生 `hidden_<原名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 目标已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文本数据的载体路径。
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// 编码时设置的密码 (若有)。
    #[arg(short, long)]
    pub password: Option<String>,

    /// 恢复文本后，保存文本内容的输出路径；缺省时打印到标准输出。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}
