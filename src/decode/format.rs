/// Closed set of input formats the decoder understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// PNG, including animated PNG.
    Png,
    /// Baseline/progressive JPEG.
    Jpeg,
    /// GIF87a/GIF89a, still or animated.
    Gif,
    /// WebP, still or animated.
    #[serde(rename = "webp")]
    WebP,
    /// Windows bitmap.
    Bmp,
}

impl SourceFormat {
    /// All supported formats, in detection order.
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::Png,
        SourceFormat::Jpeg,
        SourceFormat::Gif,
        SourceFormat::WebP,
        SourceFormat::Bmp,
    ];

    /// Detect the format from magic bytes. Returns `None` if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        if data.starts_with(b"BM") && data.len() >= 14 {
            return Some(Self::Bmp);
        }
        None
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
        }
    }

    /// Whether the container can carry more than one frame.
    pub fn supports_animation(self) -> bool {
        matches!(self, Self::Png | Self::Gif | Self::WebP)
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::WebP => image::ImageFormat::WebP,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
