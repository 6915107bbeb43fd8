//! # 载体调度模块
//!
//! 按载体的形态选择编码路径：单张无损图像直接走 LSB 编解码；
//! 帧序列 (目录中按文件名排序的无损帧) 则把整个载荷写入其中一帧，
//! 其余帧逐字节保留。对调用方只暴露 encode / decode 两个操作。

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::bitmap::BitmapAccess;
use crate::constants::PAYLOAD_FRAME_INDEX;
use crate::envelope::PayloadEnvelope;
use crate::error::StegoError;
use crate::steganography;

/// 支持的图像扩展名，全部为无损像素格式。
const IMAGE_EXTENSIONS: &[&str] = &["png", "bmp", "tif", "tiff", "webp", "qoi"];

/// 常见有损视频容器的扩展名。重编码会摧毁 LSB 平面，直接拒绝。
const LOSSY_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// 载体的分类结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    /// 单张无损图像。
    Image,
    /// 无损帧序列目录，按文件名排序构成有序帧。
    FrameSequence,
}

impl CarrierKind {
    /// 按路径形态与扩展名分类载体。
    pub fn classify(path: &Path) -> Result<Self, StegoError> {
        if path.is_dir() {
            return Ok(Self::FrameSequence);
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(Self::Image);
        }
        if LOSSY_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            return Err(StegoError::CarrierUnreadable {
                reason: format!(
                    "'{}' is a lossy video container and re-encoding would destroy the hidden bits. \nExtract the frames into a lossless sequence directory first.",
                    path.display()
                ),
            });
        }
        Err(StegoError::CarrierUnreadable {
            reason: format!("'{}' is not a supported lossless carrier.", path.display()),
        })
    }
}

/// 编码结果：不透明标识 + 新载体的位置。
#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub id: String,
    pub uri: PathBuf,
}

/// 把秘密文本 (及可选密码) 编码进载体，产出新的载体。
///
/// `dest` 缺省时由访问层在源旁派生默认输出路径。
/// 源载体在任何失败下都保持原样。
pub fn encode(
    carrier: &Path,
    secret: &str,
    password: Option<&str>,
    dest: Option<&Path>,
) -> Result<EncodeOutcome, StegoError> {
    let envelope = PayloadEnvelope::new(secret, password)?;
    let payload = envelope.to_bytes();

    let uri = match CarrierKind::classify(carrier)? {
        CarrierKind::Image => {
            let mut access = BitmapAccess::open(carrier)?;
            if let Some(dest) = dest {
                access = access.with_output(dest.to_owned());
            }
            steganography::embed(&mut access, &payload)?
        }
        CarrierKind::FrameSequence => encode_frames(carrier, &payload, dest)?,
    };

    Ok(EncodeOutcome {
        id: Uuid::new_v4().to_string(),
        uri,
    })
}

/// 从载体中恢复秘密文本。
pub fn decode(carrier: &Path, password: Option<&str>) -> Result<String, StegoError> {
    let raw = match CarrierKind::classify(carrier)? {
        CarrierKind::Image => steganography::extract(&BitmapAccess::open(carrier)?)?,
        CarrierKind::FrameSequence => {
            let frames = list_frames(carrier)?;
            steganography::extract(&BitmapAccess::open(&frames[PAYLOAD_FRAME_INDEX])?)?
        }
    };
    open_envelope(raw, password)
}

/// 校验密码并取出秘密文本。
/// 解不开信封但字节是合法 UTF-8 时，按旧版裸文本载荷原样返回。
fn open_envelope(raw: Vec<u8>, password: Option<&str>) -> Result<String, StegoError> {
    match PayloadEnvelope::from_bytes(&raw) {
        Ok(envelope) => match (envelope.password.as_deref(), password) {
            (None, _) => Ok(envelope.secret),
            (Some(stored), Some(given)) if stored == given => Ok(envelope.secret),
            (Some(_), _) => Err(StegoError::InvalidPassword),
        },
        Err(StegoError::MalformedEnvelope) => {
            String::from_utf8(raw).map_err(|_| StegoError::MalformedEnvelope)
        }
        Err(e) => Err(e),
    }
}

/// 列出帧序列目录中的无损帧，按文件名排序。空目录视为不可读载体。
fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, StegoError> {
    let mut frames: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    frames.sort();
    if frames.is_empty() {
        return Err(StegoError::CarrierUnreadable {
            reason: format!("'{}' contains no lossless frames.", dir.display()),
        });
    }
    Ok(frames)
}

/// 为帧序列派生默认输出目录：与源同级的 `hidden_<目录名>`。
pub fn default_sequence_output(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frames".to_owned());
    dir.with_file_name(format!("hidden_{name}"))
}

/// 帧序列编码：载荷整体写入单独一帧，其余帧原样复制。
/// 输出先在临时目录组装，成功后整体改名发布，失败不会留下半成品。
fn encode_frames(
    dir: &Path,
    payload: &[u8],
    dest: Option<&Path>,
) -> Result<PathBuf, StegoError> {
    let frames = list_frames(dir)?;
    let out_dir = dest
        .map(Path::to_owned)
        .unwrap_or_else(|| default_sequence_output(dir));
    let parent = match out_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".hushpix-frames-")
        .tempdir_in(parent)?;

    for (index, frame) in frames.iter().enumerate() {
        let name = frame.file_name().ok_or_else(|| StegoError::CarrierUnreadable {
            reason: format!("'{}' has no usable file name.", frame.display()),
        })?;
        if index == PAYLOAD_FRAME_INDEX {
            let mut access = BitmapAccess::open(frame)?
                .with_output(staging.path().join(name).with_extension("png"));
            steganography::embed(&mut access, payload)?;
        } else {
            fs::copy(frame, staging.path().join(name))?;
        }
    }

    tracing::info!(frames = frames.len(), out = %out_dir.display(), "frame sequence staged");
    let staged = staging.keep();
    if let Err(e) = fs::rename(&staged, &out_dir) {
        let _ = fs::remove_dir_all(&staged);
        return Err(e.into());
    }
    Ok(out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognizes_lossless_images() {
        for name in ["a.png", "b.BMP", "c.tif", "d.tiff", "e.webp", "f.qoi"] {
            assert_eq!(
                CarrierKind::classify(Path::new(name)).unwrap(),
                CarrierKind::Image
            );
        }
    }

    #[test]
    fn classify_recognizes_frame_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            CarrierKind::classify(dir.path()).unwrap(),
            CarrierKind::FrameSequence
        );
    }

    #[test]
    fn classify_rejects_lossy_video_containers() {
        let err = CarrierKind::classify(Path::new("clip.mp4")).unwrap_err();
        match err {
            StegoError::CarrierUnreadable { reason } => {
                assert!(reason.contains("lossy video container"), "reason: {reason}")
            }
            other => panic!("expected CarrierUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn classify_rejects_unknown_extensions() {
        assert!(matches!(
            CarrierKind::classify(Path::new("notes.txt")),
            Err(StegoError::CarrierUnreadable { .. })
        ));
        assert!(matches!(
            CarrierKind::classify(Path::new("no_extension")),
            Err(StegoError::CarrierUnreadable { .. })
        ));
    }

    #[test]
    fn open_envelope_password_rules() {
        let sealed = |password: Option<&str>| {
            PayloadEnvelope::new("the secret", password).unwrap().to_bytes()
        };

        // 未设密码：带不带密码都能解
        assert_eq!(open_envelope(sealed(None), None).unwrap(), "the secret");
        assert_eq!(
            open_envelope(sealed(None), Some("anything")).unwrap(),
            "the secret"
        );

        // 设了密码：必须提供且一致
        assert_eq!(
            open_envelope(sealed(Some("north")), Some("north")).unwrap(),
            "the secret"
        );
        assert!(matches!(
            open_envelope(sealed(Some("north")), Some("south")),
            Err(StegoError::InvalidPassword)
        ));
        assert!(matches!(
            open_envelope(sealed(Some("north")), None),
            Err(StegoError::InvalidPassword)
        ));

        // 空字符串密码与未设密码不同
        assert!(matches!(
            open_envelope(sealed(Some("")), None),
            Err(StegoError::InvalidPassword)
        ));
        assert_eq!(open_envelope(sealed(Some("")), Some("")).unwrap(), "the secret");
    }

    #[test]
    fn open_envelope_falls_back_to_legacy_text() {
        let raw = b"plain legacy payload".to_vec();
        assert_eq!(
            open_envelope(raw, Some("ignored")).unwrap(),
            "plain legacy payload"
        );
    }

    #[test]
    fn open_envelope_rejects_non_text_garbage() {
        assert!(matches!(
            open_envelope(vec![0xFF, 0xC0, 0x00], None),
            Err(StegoError::MalformedEnvelope)
        ));
    }

    #[test]
    fn default_sequence_output_is_a_sibling() {
        assert_eq!(
            default_sequence_output(Path::new("/data/clips/beach")),
            Path::new("/data/clips/hidden_beach")
        );
    }
}
