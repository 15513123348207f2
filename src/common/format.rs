use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl Format {
    pub fn infer(data: &[u8]) -> Result<Format> {
        match infer::get(data) {
            Some(kind) => match kind.extension() {
                "jpeg" => Ok(Format::Jpeg),
                "jpg" => Ok(Format::Jpeg),
                "png" => Ok(Format::Png),
                "webp" => Ok(Format::WebP),
                "gif" => Ok(Format::Gif),
                other => Err(anyhow!("unsupported format: {}", other)),
            },
            None => Err(anyhow!("could not get format")),
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Format::Jpeg => image::ImageFormat::Jpeg,
            Format::Png => image::ImageFormat::Png,
            Format::WebP => image::ImageFormat::WebP,
            Format::Gif => image::ImageFormat::Gif,
        }
    }
}
