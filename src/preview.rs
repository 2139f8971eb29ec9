//! アップロード画像のプレビュー生成
//!
//! ネットワークを使わずローカルでデコードし、縮小したPNGのData URLを作る。

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// プレビューの最大辺（px）
pub const PREVIEW_MAX_SIZE: u32 = 256;

/// 画像バイト列からプレビュー用Data URLを生成
pub fn preview_data_url(bytes: &[u8]) -> Result<String> {
    let image = image::load_from_memory(bytes)?;
    let thumb = image.thumbnail(PREVIEW_MAX_SIZE, PREVIEW_MAX_SIZE);
    let thumb = DynamicImage::ImageRgba8(thumb.to_rgba8());

    let mut buffer = Vec::new();
    thumb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&buffer)))
}

/// ファイル名の拡張子からMIMEタイプを推定
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
