//! 画像ファイルの読み込み
//!
//! CLIから渡された写真を Data URL に変換する（HTTP経由と同じ入力形式にそろえる）

use crate::error::{AppError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use std::path::Path;

/// 視覚モデルに渡せる形式
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

/// バイト列の先頭から形式を判定
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .filter(|format| SUPPORTED_FORMATS.contains(format))
}

/// バイト列を Data URL に変換
pub fn encode_data_url(bytes: &[u8], format: ImageFormat) -> String {
    format!("data:{};base64,{}", format.to_mime_type(), STANDARD.encode(bytes))
}

/// 画像ファイルを Data URL として読み込み
pub fn load_data_url(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(AppError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let format = detect_format(&bytes).ok_or_else(|| {
        AppError::ImageLoad(format!("{}: 対応していない画像形式です", path.display()))
    })?;

    Ok(encode_data_url(&bytes, format))
}
