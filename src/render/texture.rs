use std::sync::mpsc;

use image::RgbaImage;
use vello::wgpu;

use crate::{
  error::{Result, VizuError},
  render::{GpuHandle, RenderConfig},
};

/// Copies the render texture into a CPU image, blocking until the GPU is done.
pub fn read_rgba(handle: &GpuHandle, config: RenderConfig) -> Result<RgbaImage> {
  let unpadded = 4 * config.width;
  let padded = padded_bytes_per_row(config.width);

  let buffer = handle.device.create_buffer(&wgpu::BufferDescriptor {
    label:              Some("Output Buffer"),
    size:               u64::from(padded) * u64::from(config.height),
    usage:              wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
    mapped_at_creation: false,
  });

  let mut encoder = handle.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
    label: Some("texture_buffer_copy_encoder"),
  });

  encoder.copy_texture_to_buffer(
    wgpu::TexelCopyTextureInfo {
      texture:   &handle.texture,
      mip_level: 0,
      origin:    wgpu::Origin3d::ZERO,
      aspect:    wgpu::TextureAspect::All,
    },
    wgpu::TexelCopyBufferInfo {
      buffer: &buffer,
      layout: wgpu::TexelCopyBufferLayout {
        offset:         0,
        bytes_per_row:  Some(padded),
        rows_per_image: Some(config.height),
      },
    },
    config.extent_3d(),
  );

  handle.queue.submit(std::iter::once(encoder.finish()));

  let slice = buffer.slice(..);
  let (tx, rx) = mpsc::channel();
  slice.map_async(wgpu::MapMode::Read, move |result| {
    let _ = tx.send(result);
  });
  handle
    .device
    .poll(wgpu::PollType::Wait)
    .map_err(|e| VizuError::Gpu(format!("failed to wait for readback: {e}")))?;
  rx.recv()
    .map_err(|_| VizuError::Gpu("readback callback dropped".to_string()))?
    .map_err(|e| VizuError::Gpu(format!("failed to map output buffer: {e}")))?;

  let pixels = {
    let data = slice.get_mapped_range();
    unpad_rows(&data, padded as usize, unpadded as usize)
  };
  buffer.unmap();

  RgbaImage::from_raw(config.width, config.height, pixels)
    .ok_or_else(|| VizuError::Gpu("readback size mismatch".to_string()))
}

/// Texture copies need rows aligned to [`wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`].
fn padded_bytes_per_row(width: u32) -> u32 {
  let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
  (4 * width).div_ceil(align) * align
}

fn unpad_rows(data: &[u8], padded: usize, unpadded: usize) -> Vec<u8> {
  let mut pixels = Vec::with_capacity(data.len() / padded.max(1) * unpadded);
  for row in data.chunks_exact(padded) {
    pixels.extend_from_slice(&row[..unpadded]);
  }
  pixels
}
