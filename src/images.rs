use uuid::Uuid;

/// Image formats accepted by the upload endpoint, recognized by content
/// sniffing rather than by trusting the client's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    /// Identify the format from the payload's magic bytes. Anything that
    /// does not carry a known signature is not an image.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    pub fn ext(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// Object key for a recipe image. A fresh UUID component means a re-upload
/// never overwrites the previous blob in place.
pub fn object_key(owner: Uuid, recipe_id: i64, format: ImageFormat) -> String {
    format!(
        "recipes/{}/{}-{}.{}",
        owner,
        recipe_id,
        Uuid::new_v4(),
        format.ext()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_known_signatures() {
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::sniff(b"\x89PNG\r\n\x1a\nrest-of-file"),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x10\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a..."), Some(ImageFormat::Gif));
    }

    #[test]
    fn rejects_non_image_payloads() {
        assert_eq!(ImageFormat::sniff(b"notimage"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
        assert_eq!(ImageFormat::sniff(b"RIFF1234WAVE"), None);
    }

    #[test]
    fn object_key_carries_owner_recipe_and_extension() {
        let owner = Uuid::new_v4();
        let key = object_key(owner, 42, ImageFormat::Png);
        assert!(key.starts_with(&format!("recipes/{}/42-", owner)));
        assert!(key.ends_with(".png"));
    }
}
