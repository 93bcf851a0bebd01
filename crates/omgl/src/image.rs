//! Decoding of PNG and JPEG files into raw 8-bit pixel data for textures.

use crate::impl_prelude::*;
use prelude_plus::*;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = b"\xff\xd8\xff";

/// Tightly packed 8-bit pixels, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
  pub width: usize,
  pub height: usize,
  pub channels: usize,
  pub data: Vec<u8>,
}

impl ImageData {
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    trace!("decoding image {:?}", path);
    Self::decode(&fs::read(path)?)
  }

  /// Picks the decoder by the magic bytes at the start of `bytes`.
  pub fn decode(bytes: &[u8]) -> Result<Self> {
    if bytes.starts_with(PNG_SIGNATURE) {
      Self::decode_png(bytes)
    } else if bytes.starts_with(JPEG_SIGNATURE) {
      Self::decode_jpeg(bytes)
    } else {
      Err(Error::UnsupportedImage("unknown file format".to_owned()))
    }
  }

  fn decode_png(bytes: &[u8]) -> Result<Self> {
    use png::{ColorType, Transformations};

    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut data = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut data)?;
    data.truncate(info.buffer_size());

    let channels = match info.color_type {
      ColorType::Grayscale => 1,
      ColorType::GrayscaleAlpha => 2,
      ColorType::Rgb => 3,
      ColorType::Rgba => 4,
      ColorType::Indexed => {
        return Err(Error::UnsupportedImage("indexed PNG colors were not expanded".to_owned()));
      }
    };

    Ok(Self { width: info.width as usize, height: info.height as usize, channels, data })
  }

  fn decode_jpeg(bytes: &[u8]) -> Result<Self> {
    let mut decoder = jpeg_decoder::Decoder::new(bytes);
    let data = decoder.decode()?;
    let info = decoder
      .info()
      .ok_or_else(|| Error::UnsupportedImage("JPEG without a header".to_owned()))?;

    #[allow(unreachable_patterns)]
    let channels = match info.pixel_format {
      jpeg_decoder::PixelFormat::L8 => 1,
      jpeg_decoder::PixelFormat::RGB24 => 3,
      other => return Err(Error::UnsupportedImage(format!("JPEG pixel format {:?}", other))),
    };

    Ok(Self { width: info.width as usize, height: info.height as usize, channels, data })
  }

  #[inline]
  pub fn row_len(&self) -> usize { self.width * self.channels }

  /// Reverses the order of rows, GL textures start from the bottom row.
  pub fn flip_vertically(&mut self) {
    let row_len = self.row_len();
    if row_len == 0 {
      return;
    }
    let half = self.height / 2;
    let (top, bottom) = self.data.split_at_mut(half * row_len);
    let bottom_start = bottom.len() - half * row_len;
    for (i, top_row) in top.chunks_exact_mut(row_len).enumerate() {
      let start = bottom_start + (half - 1 - i) * row_len;
      top_row.swap_with_slice(&mut bottom[start..start + row_len]);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
      let mut encoder = png::Encoder::new(&mut out, width, height);
      encoder.set_color(color);
      encoder.set_depth(png::BitDepth::Eight);
      let mut writer = encoder.write_header().unwrap();
      writer.write_image_data(data).unwrap();
    }
    out
  }

  #[test]
  fn flips_rows() {
    let mut image = ImageData { width: 2, height: 3, channels: 1, data: vec![1, 2, 3, 4, 5, 6] };
    image.flip_vertically();
    assert_eq!(image.data, vec![5, 6, 3, 4, 1, 2]);

    let mut image = ImageData { width: 1, height: 2, channels: 2, data: vec![1, 2, 3, 4] };
    image.flip_vertically();
    assert_eq!(image.data, vec![3, 4, 1, 2]);
  }

  #[test]
  fn decodes_png() {
    let pixels = [255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9];
    let encoded = encode_png(2, 2, png::ColorType::Rgb, &pixels);
    let image = ImageData::decode(&encoded).unwrap();
    assert_eq!(image, ImageData { width: 2, height: 2, channels: 3, data: pixels.to_vec() });
  }

  #[test]
  fn decodes_grey_alpha_png() {
    let pixels = [10, 255, 20, 128];
    let encoded = encode_png(2, 1, png::ColorType::GrayscaleAlpha, &pixels);
    let image = ImageData::decode(&encoded).unwrap();
    assert_eq!(image.channels, 2);
    assert_eq!(image.data, pixels.to_vec());
  }

  #[test]
  fn rejects_unknown_formats() {
    assert!(matches!(ImageData::decode(b"GIF89a"), Err(Error::UnsupportedImage(_))));
    assert!(matches!(ImageData::decode(&[]), Err(Error::UnsupportedImage(_))));
  }
}
