//! Media type detection from the leading bytes of a file.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use content_inspector::ContentType;

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Media type families that are worth archiving.
const USEFUL_PREFIXES: [&str; 3] = ["image/", "text/", "video/"];

/// `ftyp` brands of the HEIF family; anything else with an `ftyp` box is treated
/// as ISO/QuickTime video if its brand is known.
const HEIF_BRANDS: [&[u8; 4]; 5] = [b"heic", b"heix", b"heif", b"mif1", b"msf1"];
const MP4_BRAND_PREFIXES: [&[u8]; 7] = [b"mp4", b"iso", b"avc", b"M4V", b"M4A", b"3g", b"dash"];

/// Reads at most [`SNIFF_LEN`] bytes from the start of `path`.
pub fn read_head(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    Ok(head)
}

/// Infers the media type of `head`. Only the first [`SNIFF_LEN`] bytes are considered.
///
/// Image formats are recognized by the `image` crate's signature table, a few
/// container formats are recognized as video, and anything free of NUL and other
/// binary control bytes is plain text. Empty input carries no evidence and is reported as
/// [`OCTET_STREAM`].
pub fn detect_media_type(head: &[u8]) -> &'static str {
    let head = &head[..head.len().min(SNIFF_LEN)];
    if head.is_empty() {
        return OCTET_STREAM;
    }

    if let Ok(format) = image::guess_format(head) {
        return format.to_mime_type();
    }

    if let Some(media_type) = detect_container(head) {
        return media_type;
    }

    match content_inspector::inspect(head) {
        ContentType::BINARY => OCTET_STREAM,
        ContentType::UTF_8 | ContentType::UTF_8_BOM if has_binary_control_bytes(head) => {
            OCTET_STREAM
        }
        _ => TEXT_PLAIN,
    }
}

/// Control characters that never occur in text files. Tab, line feed, form feed,
/// carriage return and escape are allowed.
fn has_binary_control_bytes(head: &[u8]) -> bool {
    head.iter()
        .any(|&byte| matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F))
}

/// Whether a media type belongs in a comic archive.
pub fn is_useful_media_type(media_type: &str) -> bool {
    USEFUL_PREFIXES
        .iter()
        .any(|prefix| media_type.starts_with(prefix))
}

fn detect_container(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("video/webm");
    }
    if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"AVI " {
        return Some("video/avi");
    }
    if head.starts_with(&[0x00, 0x00, 0x01, 0xBA]) || head.starts_with(&[0x00, 0x00, 0x01, 0xB3]) {
        return Some("video/mpeg");
    }
    if head.starts_with(b"FLV\x01") {
        return Some("video/x-flv");
    }
    detect_ftyp(head)
}

/// ISO base media file: `[size:u32][ftyp][major brand][minor version][compatible brands...]`.
fn detect_ftyp(head: &[u8]) -> Option<&'static str> {
    if head.len() < 12 || &head[4..8] != b"ftyp" {
        return None;
    }
    let box_size = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as usize;
    if box_size < 12 {
        return None;
    }
    let end = box_size.min(head.len());

    let brands = (8..end)
        .step_by(4)
        .filter(|&offset| offset != 12 && offset + 4 <= end)
        .map(|offset| &head[offset..offset + 4]);

    let mut media_type = None;
    for brand in brands {
        if HEIF_BRANDS.iter().any(|heif| brand == &heif[..]) {
            return Some("image/heif");
        }
        if brand == b"qt  " {
            media_type = media_type.or(Some("video/quicktime"));
        } else if MP4_BRAND_PREFIXES
            .iter()
            .any(|prefix| brand.starts_with(prefix))
        {
            media_type = media_type.or(Some("video/mp4"));
        }
    }
    media_type
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ftyp(brands: &[&[u8; 4]]) -> Vec<u8> {
        let size = 16 + 4 * brands.len().saturating_sub(1);
        let mut data = (size as u32).to_be_bytes().to_vec();
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(brands[0]);
        data.extend_from_slice(&[0, 0, 0, 0]);
        for brand in &brands[1..] {
            data.extend_from_slice(*brand);
        }
        data.extend_from_slice(&[0, 0, 0, 8, b'f', b'r', b'e', b'e']);
        data
    }

    #[test]
    fn detects_image_signatures() {
        assert_eq!(detect_media_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]), "image/jpeg");
        assert_eq!(
            detect_media_type(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            "image/png"
        );
        assert_eq!(detect_media_type(b"GIF89a\x01\x00\x01\x00"), "image/gif");
        assert_eq!(detect_media_type(b"RIFF\x10\0\0\0WEBPVP8 "), "image/webp");
    }

    #[test]
    fn detects_video_containers() {
        assert_eq!(detect_media_type(&[0x1A, 0x45, 0xDF, 0xA3, 0x9F, 0x42]), "video/webm");
        assert_eq!(detect_media_type(b"RIFF\x10\0\0\0AVI LIST"), "video/avi");
        assert_eq!(detect_media_type(&ftyp(&[b"isom", b"mp41"])), "video/mp4");
        assert_eq!(detect_media_type(&ftyp(&[b"qt  "])), "video/quicktime");
        assert_eq!(detect_media_type(&ftyp(&[b"heic", b"mif1"])), "image/heif");
    }

    #[test]
    fn text_and_binary_fallbacks() {
        assert_eq!(detect_media_type(b"Scanned by someone\nEnjoy!\n"), TEXT_PLAIN);
        assert_eq!(detect_media_type(&[0x00, 0x01, 0x02, 0x03, 0xFE]), OCTET_STREAM);
        assert_eq!(detect_media_type(&[]), OCTET_STREAM);
    }

    #[test]
    fn control_bytes_without_nul_are_binary() {
        let high_entropy: Vec<u8> = (1u8..=255).chain(1u8..=255).collect();
        assert_eq!(detect_media_type(&high_entropy), OCTET_STREAM);
        assert_eq!(detect_media_type(b"page\x02data\x7fmore"), OCTET_STREAM);
        assert_eq!(detect_media_type(b"header\x0bvalue"), OCTET_STREAM);
    }

    #[test]
    fn text_control_characters_stay_text() {
        assert_eq!(
            detect_media_type(b"Title\tVolume 1\r\n\x0cNext page\n\x1b[1mbold\x1b[0m\n"),
            TEXT_PLAIN
        );
        // UTF-16 text carries NUL bytes but a byte order mark identifies it
        assert_eq!(detect_media_type(b"\xff\xfeH\x00i\x00\n\x00"), TEXT_PLAIN);
    }

    #[test]
    fn only_image_text_and_video_are_useful() {
        assert!(is_useful_media_type("image/jpeg"));
        assert!(is_useful_media_type(TEXT_PLAIN));
        assert!(is_useful_media_type("video/mp4"));
        assert!(!is_useful_media_type(OCTET_STREAM));
        assert!(!is_useful_media_type("application/pdf"));
    }
}
