//! Resized WebP variants for uploaded images.

use super::MediaError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

pub const WEBP: &str = "image/webp";
pub const PDF: &str = "application/pdf";
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

pub const RESUME_KEY: &str = "resume/resume_latest.pdf";

/// Filename prefixes shared by every variant of one upload.
pub const VARIANT_PREFIXES: [&str; 8] = [
    "thumb_",
    "med_",
    "lg_",
    "orig_",
    "featured_",
    "headshot_",
    "company_",
    "badge_",
];

const FILE_ID_LEN: usize = 12;
const ORIGINAL_QUALITY: f32 = 90.0;

/// Largest side libwebp can encode.
pub const MAX_SIDE: u32 = 16383;
pub const MAX_PIXELS: u64 = 50_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Projects,
    Blog,
    Profile,
    Logos,
    Certifications,
    Resume,
}

impl Folder {
    pub const ALL: [Folder; 6] = [
        Folder::Projects,
        Folder::Blog,
        Folder::Profile,
        Folder::Logos,
        Folder::Certifications,
        Folder::Resume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Projects => "projects",
            Folder::Blog => "blog",
            Folder::Profile => "profile",
            Folder::Logos => "logos",
            Folder::Certifications => "certifications",
            Folder::Resume => "resume",
        }
    }

    pub fn requires_entity_id(&self) -> bool {
        matches!(self, Folder::Blog | Folder::Logos | Folder::Certifications)
    }

    pub fn names() -> String {
        Folder::ALL
            .iter()
            .map(Folder::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True when `key` lives under one of the upload folders.
    pub fn owns_key(key: &str) -> bool {
        Folder::ALL
            .iter()
            .any(|folder| key.starts_with(&format!("{}/", folder.as_str())))
    }
}

impl FromStr for Folder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Folder::ALL
            .iter()
            .copied()
            .find(|folder| folder.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Fit {
    /// Crop to fill exactly, centred.
    Cover,
    /// Fit within the box, never upscaling.
    Inside,
}

#[derive(Debug, Clone, Copy)]
struct Resize {
    width: u32,
    height: u32,
    fit: Fit,
    quality: f32,
}

/// One encoded rendition plus the object key it is stored under.
#[derive(Debug, Clone)]
pub struct Variant {
    pub label: &'static str,
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub variants: Vec<Variant>,
    pub primary_key: String,
}

pub fn new_file_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FILE_ID_LEN)
        .map(char::from)
        .collect()
}

/// Entity ids become part of object keys, so only plain segments pass.
pub fn is_safe_segment(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 100
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Decode, auto-orient, and encode every variant the folder calls for.
///
/// CPU bound; callers run it under `spawn_blocking`.
pub fn process(
    bytes: &[u8],
    folder: Folder,
    entity_id: Option<&str>,
    file_id: &str,
) -> Result<ProcessedImage, MediaError> {
    let image = decode(bytes)?;

    let plan: Vec<(&'static str, String, Option<Resize>)> = match folder {
        Folder::Profile => vec![
            (
                "display",
                format!("profile/headshot_{file_id}.webp"),
                Some(Resize { width: 400, height: 400, fit: Fit::Cover, quality: 85.0 }),
            ),
            ("original", format!("profile/orig_{file_id}.webp"), None),
        ],
        Folder::Logos | Folder::Certifications => {
            let entity = required_entity(folder, entity_id)?;
            let prefix = if folder == Folder::Certifications { "badge" } else { "company" };
            vec![
                (
                    "display",
                    format!("{folder}/{prefix}_{entity}_{file_id}.webp"),
                    Some(Resize { width: 200, height: 200, fit: Fit::Inside, quality: 85.0 }),
                ),
                ("original", format!("{folder}/orig_{entity}_{file_id}.webp"), None),
            ]
        }
        Folder::Blog => {
            let post = required_entity(folder, entity_id)?;
            vec![
                (
                    "featured",
                    format!("blog/{post}/featured_{file_id}.webp"),
                    Some(Resize { width: 1200, height: 630, fit: Fit::Cover, quality: 85.0 }),
                ),
                ("original", format!("blog/{post}/orig_{file_id}.webp"), None),
            ]
        }
        Folder::Projects | Folder::Resume => {
            let base = match entity_id {
                Some(entity) => format!("{folder}/{entity}"),
                None => folder.to_string(),
            };
            vec![
                (
                    "thumbnail",
                    format!("{base}/thumb_{file_id}.webp"),
                    Some(Resize { width: 400, height: 300, fit: Fit::Cover, quality: 80.0 }),
                ),
                (
                    "medium",
                    format!("{base}/med_{file_id}.webp"),
                    Some(Resize { width: 800, height: 600, fit: Fit::Inside, quality: 80.0 }),
                ),
                (
                    "large",
                    format!("{base}/lg_{file_id}.webp"),
                    Some(Resize { width: 1600, height: 1200, fit: Fit::Inside, quality: 85.0 }),
                ),
                ("original", format!("{base}/orig_{file_id}.webp"), None),
            ]
        }
    };

    let mut variants = Vec::with_capacity(plan.len());
    for (label, key, resize) in plan {
        let bytes = match resize {
            Some(resize) => encode_webp(&apply(&image, resize), resize.quality)?,
            None => encode_webp(&image, ORIGINAL_QUALITY)?,
        };
        variants.push(Variant {
            label,
            key,
            bytes,
            content_type: WEBP,
        });
    }

    // Multi-size uploads point at the original; the rest at their display rendition.
    let primary_key = match folder {
        Folder::Projects | Folder::Resume => variants.iter().find(|v| v.label == "original"),
        _ => variants.first(),
    }
    .map(|v| v.key.clone())
    .unwrap_or_default();

    Ok(ProcessedImage {
        variants,
        primary_key,
    })
}

fn required_entity(folder: Folder, entity_id: Option<&str>) -> Result<String, MediaError> {
    entity_id
        .map(str::to_string)
        .ok_or(MediaError::MissingEntityId(folder))
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, MediaError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MediaError::Decode(e.to_string()))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| MediaError::Decode(e.to_string()))?;
    let (width, height) = decoder.dimensions();
    check_dimensions(width, height)?;
    let orientation = decoder
        .orientation()
        .map_err(|e| MediaError::Decode(e.to_string()))?;
    let mut image =
        DynamicImage::from_decoder(decoder).map_err(|e| MediaError::Decode(e.to_string()))?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Rejected before any pixel is decoded.
fn check_dimensions(width: u32, height: u32) -> Result<(), MediaError> {
    if width > MAX_SIDE || height > MAX_SIDE || u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(MediaError::TooLarge {
            width,
            height,
            max_side: MAX_SIDE,
            max_pixels: MAX_PIXELS,
        });
    }
    Ok(())
}

fn apply(image: &DynamicImage, resize: Resize) -> DynamicImage {
    match resize.fit {
        Fit::Cover => cover_crop(image, resize.width, resize.height).resize_exact(
            resize.width,
            resize.height,
            FilterType::Lanczos3,
        ),
        Fit::Inside if image.width() <= resize.width && image.height() <= resize.height => {
            image.clone()
        }
        Fit::Inside => image.resize(resize.width, resize.height, FilterType::Lanczos3),
    }
}

/// Centred crop of `image` to the `width:height` aspect ratio.
fn cover_crop(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (src_w, src_h) = (u64::from(image.width()), u64::from(image.height()));
    let (dst_w, dst_h) = (u64::from(width), u64::from(height));
    let (crop_w, crop_h) = if src_w * dst_h > src_h * dst_w {
        ((src_h * dst_w / dst_h).clamp(1, src_w), src_h)
    } else {
        (src_w, (src_w * dst_h / dst_w).clamp(1, src_h))
    };
    // Both crop sides are bounded by the source, which fits in u32.
    let (crop_w, crop_h) = (crop_w as u32, crop_h as u32);
    image.crop_imm(
        (image.width() - crop_w) / 2,
        (image.height() - crop_h) / 2,
        crop_w,
        crop_h,
    )
}

fn encode_webp(image: &DynamicImage, quality: f32) -> Result<Vec<u8>, MediaError> {
    let rgba = image.to_rgba8();
    webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, quality)
        .map(|encoded| encoded.to_vec())
        .map_err(|e| MediaError::Encode(format!("{e:?}")))
}

/// Split a variant key into `(folder/, base id)` when its filename carries
/// a known variant prefix.
pub fn variant_base(key: &str) -> Option<(&str, &str)> {
    let split = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    let (dir, filename) = key.split_at(split);
    VARIANT_PREFIXES.iter().find_map(|prefix| {
        filename
            .strip_prefix(prefix)
            .filter(|base| !base.is_empty())
            .map(|base| (dir, base))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn dimensions(bytes: &[u8]) -> (u32, u32) {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::WebP).unwrap();
        (image.width(), image.height())
    }

    #[test]
    fn test_project_variants() {
        let result = process(&png(2000, 1000), Folder::Projects, Some("p1"), "abc123abc123").unwrap();
        let keys: Vec<_> = result.variants.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "projects/p1/thumb_abc123abc123.webp",
                "projects/p1/med_abc123abc123.webp",
                "projects/p1/lg_abc123abc123.webp",
                "projects/p1/orig_abc123abc123.webp",
            ]
        );
        assert_eq!(result.primary_key, "projects/p1/orig_abc123abc123.webp");

        assert_eq!(dimensions(&result.variants[0].bytes), (400, 300));
        assert_eq!(dimensions(&result.variants[1].bytes), (800, 400));
        assert_eq!(dimensions(&result.variants[2].bytes), (1600, 800));
        assert_eq!(dimensions(&result.variants[3].bytes), (2000, 1000));
    }

    #[test]
    fn test_inside_fit_never_enlarges() {
        let result = process(&png(120, 80), Folder::Logos, Some("acme"), "id").unwrap();
        assert_eq!(result.primary_key, "logos/company_acme_id.webp");
        assert_eq!(result.variants[1].key, "logos/orig_acme_id.webp");
        assert_eq!(dimensions(&result.variants[0].bytes), (120, 80));
    }

    #[test]
    fn test_profile_blog_and_badge_keys() {
        let profile = process(&png(50, 50), Folder::Profile, None, "f").unwrap();
        assert_eq!(profile.primary_key, "profile/headshot_f.webp");
        assert_eq!(dimensions(&profile.variants[0].bytes), (400, 400));

        let blog = process(&png(50, 50), Folder::Blog, Some("post"), "f").unwrap();
        assert_eq!(blog.primary_key, "blog/post/featured_f.webp");
        assert_eq!(dimensions(&blog.variants[0].bytes), (1200, 630));

        let badge = process(&png(50, 50), Folder::Certifications, Some("aws"), "f").unwrap();
        assert_eq!(badge.primary_key, "certifications/badge_aws_f.webp");
    }

    #[test]
    fn test_entity_id_required_and_decode_errors() {
        assert!(matches!(
            process(&png(10, 10), Folder::Blog, None, "f"),
            Err(MediaError::MissingEntityId(Folder::Blog))
        ));
        assert!(matches!(
            process(b"definitely not an image", Folder::Projects, None, "f"),
            Err(MediaError::Decode(_))
        ));
    }

    #[test]
    fn test_cover_crops_extreme_aspect_ratios_before_resizing() {
        let strip = process(&png(8000, 1), Folder::Profile, None, "f").unwrap();
        assert_eq!(dimensions(&strip.variants[0].bytes), (400, 400));
        assert_eq!(dimensions(&strip.variants[1].bytes), (8000, 1));

        let tall = process(&png(3, 6000), Folder::Blog, Some("post"), "f").unwrap();
        assert_eq!(dimensions(&tall.variants[0].bytes), (1200, 630));

        let cropped = cover_crop(&DynamicImage::new_rgba8(1000, 100), 400, 300);
        assert_eq!((cropped.width(), cropped.height()), (133, 100));
    }

    #[test]
    fn test_oversized_images_are_rejected() {
        assert!(matches!(
            process(&png(17000, 1), Folder::Profile, None, "f"),
            Err(MediaError::TooLarge { width: 17000, height: 1, .. })
        ));
        assert!(matches!(
            process(&png(17000, 2), Folder::Logos, Some("e1"), "f"),
            Err(MediaError::TooLarge { .. })
        ));
        assert!(matches!(
            check_dimensions(10000, 10000),
            Err(MediaError::TooLarge { .. })
        ));
        assert!(check_dimensions(MAX_SIDE, 1).is_ok());
    }

    #[test]
    fn test_encode_failure_is_an_error() {
        let wide = DynamicImage::new_rgba8(MAX_SIDE + 1, 1);
        assert!(matches!(encode_webp(&wide, 80.0), Err(MediaError::Encode(_))));
    }

    #[test]
    fn test_file_ids_and_segments() {
        let id = new_file_id();
        assert_eq!(id.len(), 12);
        assert!(is_safe_segment(&id));
        assert!(!is_safe_segment("../etc"));
        assert!(!is_safe_segment(""));
    }

    #[test]
    fn test_variant_base() {
        assert_eq!(
            variant_base("projects/abc/thumb_xyz.webp"),
            Some(("projects/abc/", "xyz.webp"))
        );
        assert_eq!(
            variant_base("logos/company_acme_id.webp"),
            Some(("logos/", "acme_id.webp"))
        );
        assert_eq!(variant_base("resume/resume_latest.pdf"), None);
    }

    #[test]
    fn test_folder_parsing() {
        assert_eq!("blog".parse::<Folder>(), Ok(Folder::Blog));
        assert!("tmp".parse::<Folder>().is_err());
        assert!(Folder::owns_key("certifications/badge_x.webp"));
        assert!(!Folder::owns_key("secrets/key"));
        assert_eq!(
            Folder::names(),
            "projects, blog, profile, logos, certifications, resume"
        );
    }
}
