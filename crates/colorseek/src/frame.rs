//! Raw transport frames and their conversion to the canonical RGB [`Frame`].

use std::fmt;
use std::str::FromStr;

use colorseek_core::Frame;
use serde::{Deserialize, Serialize};

/// Errors produced while turning a [`RawFrame`] into a [`Frame`].
///
/// A decode failure only affects the frame at hand; the caller drops it and
/// moves on.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("unsupported encoding `{encoding}`")]
    UnsupportedEncoding { encoding: String },

    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("row step {step} is smaller than one row ({row_bytes} bytes)")]
    StepTooSmall { step: usize, row_bytes: usize },

    #[error("payload too short (expected at least {expected} bytes, got {got})")]
    BufferTooShort { expected: usize, got: usize },

    #[error("declared size {declared:?} does not match decoded size {decoded:?}")]
    DimensionMismatch {
        declared: (u32, u32),
        decoded: (u32, u32),
    },

    #[error("malformed compressed payload: {0}")]
    Compressed(#[from] image::ImageError),
}

/// Pixel layouts accepted by [`convert_frame`].
///
/// The raw names follow `sensor_msgs/Image` conventions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    Mono8,
    Png,
    Jpeg,
}

impl Encoding {
    /// Bytes per pixel for uncompressed layouts, `None` for compressed ones.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Encoding::Rgb8 | Encoding::Bgr8 => Some(3),
            Encoding::Rgba8 | Encoding::Bgra8 => Some(4),
            Encoding::Mono8 => Some(1),
            Encoding::Png | Encoding::Jpeg => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Rgb8 => "rgb8",
            Encoding::Bgr8 => "bgr8",
            Encoding::Rgba8 => "rgba8",
            Encoding::Bgra8 => "bgra8",
            Encoding::Mono8 => "mono8",
            Encoding::Png => "png",
            Encoding::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb8" => Ok(Encoding::Rgb8),
            "bgr8" => Ok(Encoding::Bgr8),
            "rgba8" => Ok(Encoding::Rgba8),
            "bgra8" => Ok(Encoding::Bgra8),
            "mono8" | "8uc1" => Ok(Encoding::Mono8),
            "png" => Ok(Encoding::Png),
            "jpeg" | "jpg" => Ok(Encoding::Jpeg),
            _ => Err(DecodeError::UnsupportedEncoding {
                encoding: s.to_string(),
            }),
        }
    }
}

/// One frame as delivered by a camera transport.
///
/// For compressed encodings `width`/`height` may be left at 0; when set they
/// must match the decoded image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Encoding tag, e.g. `"bgr8"` or `"jpeg"`.
    pub encoding: String,
    /// Bytes per row including padding. Ignored for compressed encodings.
    pub step: usize,
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Tightly packed frame: `step` is derived from width and encoding.
    pub fn packed(width: u32, height: u32, encoding: Encoding, data: Vec<u8>) -> Self {
        let step = width as usize * encoding.bytes_per_pixel().unwrap_or(0);
        Self {
            width,
            height,
            encoding: encoding.as_str().to_string(),
            step,
            data,
        }
    }

    /// Compressed payload (PNG or JPEG) with dimensions taken from the data.
    pub fn compressed(encoding: Encoding, data: Vec<u8>) -> Self {
        Self {
            width: 0,
            height: 0,
            encoding: encoding.as_str().to_string(),
            step: 0,
            data,
        }
    }
}

/// Convert a transport frame into the canonical RGB frame.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(encoding = %raw.encoding, width = raw.width, height = raw.height))
)]
pub fn convert_frame(raw: &RawFrame) -> Result<Frame, DecodeError> {
    let encoding: Encoding = raw.encoding.parse()?;
    match encoding.bytes_per_pixel() {
        Some(bpp) => convert_raw(raw, encoding, bpp),
        None => convert_compressed(raw, encoding),
    }
}

fn convert_raw(raw: &RawFrame, encoding: Encoding, bpp: usize) -> Result<Frame, DecodeError> {
    let (width, height) = (raw.width, raw.height);
    let invalid = DecodeError::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    let row_bytes = (width as usize).checked_mul(bpp).ok_or(invalid)?;
    if raw.step < row_bytes {
        return Err(DecodeError::StepTooSmall {
            step: raw.step,
            row_bytes,
        });
    }
    // The final row may omit its padding.
    let expected = raw
        .step
        .checked_mul(height as usize - 1)
        .and_then(|v| v.checked_add(row_bytes))
        .ok_or(DecodeError::InvalidDimensions { width, height })?;
    if raw.data.len() < expected {
        return Err(DecodeError::BufferTooShort {
            expected,
            got: raw.data.len(),
        });
    }

    let mut out = Vec::with_capacity(width as usize * height as usize * 3);
    for row in raw.data.chunks(raw.step).take(height as usize) {
        for px in row[..row_bytes].chunks_exact(bpp) {
            let rgb = match encoding {
                Encoding::Rgb8 | Encoding::Rgba8 => [px[0], px[1], px[2]],
                Encoding::Bgr8 | Encoding::Bgra8 => [px[2], px[1], px[0]],
                _ => [px[0], px[0], px[0]],
            };
            out.extend_from_slice(&rgb);
        }
    }
    Frame::from_raw(width, height, out).ok_or(DecodeError::InvalidDimensions { width, height })
}

fn convert_compressed(raw: &RawFrame, encoding: Encoding) -> Result<Frame, DecodeError> {
    let format = match encoding {
        Encoding::Png => image::ImageFormat::Png,
        _ => image::ImageFormat::Jpeg,
    };
    let frame = image::load_from_memory_with_format(&raw.data, format)?.to_rgb8();
    let decoded = frame.dimensions();
    let declared = (raw.width, raw.height);
    if declared != (0, 0) && declared != decoded {
        return Err(DecodeError::DimensionMismatch { declared, decoded });
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn bgr_is_reordered_to_rgb() {
        let raw = RawFrame::packed(2, 1, Encoding::Bgr8, vec![1, 2, 3, 4, 5, 6]);
        let frame = convert_frame(&raw).expect("decode");
        assert_eq!(frame.get_pixel(0, 0), &Rgb([3, 2, 1]));
        assert_eq!(frame.get_pixel(1, 0), &Rgb([6, 5, 4]));
    }

    #[test]
    fn alpha_is_dropped() {
        let raw = RawFrame::packed(1, 2, Encoding::Bgra8, vec![10, 20, 30, 255, 40, 50, 60, 0]);
        let frame = convert_frame(&raw).expect("decode");
        assert_eq!(frame.get_pixel(0, 0), &Rgb([30, 20, 10]));
        assert_eq!(frame.get_pixel(0, 1), &Rgb([60, 50, 40]));

        let raw = RawFrame::packed(1, 1, Encoding::Rgba8, vec![7, 8, 9, 1]);
        assert_eq!(convert_frame(&raw).expect("decode").get_pixel(0, 0), &Rgb([7, 8, 9]));
    }

    #[test]
    fn mono_is_replicated() {
        let raw = RawFrame::packed(3, 1, Encoding::Mono8, vec![0, 128, 255]);
        let frame = convert_frame(&raw).expect("decode");
        assert_eq!(frame.get_pixel(1, 0), &Rgb([128, 128, 128]));
    }

    #[test]
    fn padded_rows_are_skipped() {
        let raw = RawFrame {
            width: 1,
            height: 2,
            encoding: "rgb8".into(),
            step: 4,
            // Last row without padding.
            data: vec![1, 2, 3, 99, 4, 5, 6],
        };
        let frame = convert_frame(&raw).expect("decode");
        assert_eq!(frame.as_raw(), &vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn malformed_frames_are_rejected() {
        let short = RawFrame::packed(4, 4, Encoding::Rgb8, vec![0; 47]);
        assert!(matches!(
            convert_frame(&short),
            Err(DecodeError::BufferTooShort {
                expected: 48,
                got: 47
            })
        ));

        let unknown = RawFrame {
            encoding: "yuv422".into(),
            ..RawFrame::packed(1, 1, Encoding::Rgb8, vec![0; 3])
        };
        assert!(matches!(
            convert_frame(&unknown),
            Err(DecodeError::UnsupportedEncoding { .. })
        ));

        let empty = RawFrame::packed(0, 5, Encoding::Rgb8, Vec::new());
        assert!(matches!(
            convert_frame(&empty),
            Err(DecodeError::InvalidDimensions { .. })
        ));

        let narrow = RawFrame {
            step: 2,
            ..RawFrame::packed(1, 1, Encoding::Rgb8, vec![0; 3])
        };
        assert!(matches!(
            convert_frame(&narrow),
            Err(DecodeError::StepTooSmall { .. })
        ));

        let garbage = RawFrame::compressed(Encoding::Png, vec![1, 2, 3, 4]);
        assert!(matches!(
            convert_frame(&garbage),
            Err(DecodeError::Compressed(_))
        ));
    }

    #[test]
    fn png_payload_round_trips() {
        let src = Frame::from_pixel(5, 4, Rgb([10, 200, 30]));
        let mut bytes = Vec::new();
        src.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");

        let frame = convert_frame(&RawFrame::compressed(Encoding::Png, bytes.clone()))
            .expect("decode png");
        assert_eq!(frame, src);

        let wrong = RawFrame {
            width: 9,
            height: 9,
            ..RawFrame::compressed(Encoding::Png, bytes)
        };
        assert!(matches!(
            convert_frame(&wrong),
            Err(DecodeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn encoding_names_parse_case_insensitively() {
        assert_eq!("BGR8".parse::<Encoding>().ok(), Some(Encoding::Bgr8));
        assert_eq!("jpg".parse::<Encoding>().ok(), Some(Encoding::Jpeg));
        assert_eq!(Encoding::Mono8.to_string(), "mono8");
    }
}
