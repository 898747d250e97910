use std::{
  fs::{self, File},
  io::{BufWriter, Write},
  path::Path,
};

use image::{
  Delay, Frame, RgbaImage,
  codecs::gif::{GifEncoder, Repeat},
};

use crate::error::{Result, VizuError};

/// Appends frames to a looping GIF.
pub struct GifSink<W: Write> {
  encoder: GifEncoder<W>,
  delay:   Delay,
  frames:  usize,
}

impl<W: Write> GifSink<W> {
  // NeuQuant sampling factor: 1 is best quality, 30 fastest.
  const SPEED: i32 = 10;

  pub fn new(writer: W, fps: u32) -> Result<Self> {
    check_fps(fps)?;

    let mut encoder = GifEncoder::new_with_speed(writer, Self::SPEED);
    encoder.set_repeat(Repeat::Infinite)?;

    Ok(GifSink { encoder, delay: Delay::from_numer_denom_ms(1000, fps), frames: 0 })
  }

  pub fn push(&mut self, image: RgbaImage) -> Result<()> {
    self.encoder.encode_frame(Frame::from_parts(image, 0, 0, self.delay))?;
    self.frames += 1;
    Ok(())
  }

  pub fn frames(&self) -> usize { self.frames }

  /// Writes the trailer and returns how many frames were written. The writer is not flushed.
  pub fn finish(self) -> usize {
    if self.frames == 0 {
      log::warn!("finished a GIF without any frames");
    }
    self.frames
  }
}

/// Encodes `frames` into `writer`, then flushes it. Returns the number of frames written.
pub fn write_gif<W: Write>(
  writer: &mut W,
  fps: u32,
  frames: impl IntoIterator<Item = Result<RgbaImage>>,
) -> Result<usize> {
  let mut sink = GifSink::new(&mut *writer, fps)?;
  for frame in frames {
    sink.push(frame?)?;
  }
  let written = sink.finish();

  writer.flush()?;
  Ok(written)
}

/// Writes a GIF file at `path`, creating any missing parent directories.
pub fn save_gif(
  path: &Path,
  fps: u32,
  frames: impl IntoIterator<Item = Result<RgbaImage>>,
) -> Result<usize> {
  check_fps(fps)?;
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let mut file = BufWriter::new(File::create(path)?);
  let written = write_gif(&mut file, fps, frames)?;
  file.get_ref().sync_all()?;
  Ok(written)
}

fn check_fps(fps: u32) -> Result<()> {
  if fps == 0 {
    return Err(VizuError::option("fps", "must be at least 1"));
  }
  Ok(())
}
