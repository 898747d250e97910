use std::path::Path;

use image::RgbaImage;
use kurbo::{Affine, Point, Shape, Stroke, Vec2};
use parley::{Alignment, FontWeight, Layout, PositionedLayoutItem, StyleProperty};
use peniko::{Brush, BrushRef, Color, Fill};
use vello::wgpu::{self, TextureDescriptor};

use crate::{
  error::{Result, VizuError},
  theme,
};

mod gif;
mod texture;

pub use gif::{GifSink, save_gif, write_gif};

/// Something that can be drawn frame by frame onto a fixed-size canvas.
pub(crate) trait Animation {
  fn canvas(&self) -> RenderConfig;
  fn fps(&self) -> u32;
  fn frame_count(&self) -> usize;
  fn draw_frame(&self, frame: usize, render: &mut Render) -> Result<()>;
}

pub(crate) struct Render {
  pub scene:      vello::Scene,
  pub background: Color,
  font:           parley::FontContext,
  layout:         parley::LayoutContext<Brush>,
}

pub(crate) struct GpuHandle {
  pub device:  wgpu::Device,
  pub queue:   wgpu::Queue,
  pub texture: wgpu::Texture,
  pub view:    wgpu::TextureView,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
  pub width:  u32,
  pub height: u32,
}

/// Rasterizes scenes on the GPU and reads the pixels back.
pub(crate) struct FrameRenderer {
  handle: GpuHandle,
  vello:  vello::Renderer,
  config: RenderConfig,
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Align {
  #[default]
  Start,
  Center,
  End,
}

pub(crate) struct DrawText<'a> {
  pub text:             &'a str,
  pub size:             f32,
  pub weight:           FontWeight,
  pub brush:            Brush,
  pub position:         Point,
  pub transform:        Affine,
  pub horizontal_align: Align,
  pub vertical_align:   Align,
}

impl Default for DrawText<'_> {
  fn default() -> Self {
    DrawText {
      text:             "",
      size:             16.0,
      weight:           FontWeight::NORMAL,
      brush:            Brush::Solid(theme::TEXT),
      position:         Point::ORIGIN,
      transform:        Affine::IDENTITY,
      horizontal_align: Align::Start,
      vertical_align:   Align::Start,
    }
  }
}

/// Renders every frame of `animation` and writes them to a looping GIF at `path`.
pub(crate) fn export_gif(animation: &impl Animation, path: &Path) -> Result<usize> {
  let config = animation.canvas();
  let frames = animation.frame_count();
  log::info!(
    "rendering {frames} frames at {}x{} to {}",
    config.width,
    config.height,
    path.display()
  );

  let mut renderer = FrameRenderer::new(config)?;
  let mut render = Render::new(theme::BACKGROUND);

  let images = (0..frames).map(|frame| -> Result<RgbaImage> {
    render.reset();
    animation.draw_frame(frame, &mut render)?;
    let image = renderer.rasterize(&render)?;
    log::debug!("frame {}/{frames}", frame + 1);
    Ok(image)
  });
  let written = save_gif(path, animation.fps(), images)?;
  log::info!("saved {written} frames to {}", path.display());
  Ok(written)
}

impl Render {
  pub fn new(background: Color) -> Self {
    Render {
      scene: vello::Scene::new(),
      background,
      font: parley::FontContext::new(),
      layout: parley::LayoutContext::new(),
    }
  }

  pub fn reset(&mut self) { self.scene.reset(); }

  pub fn fill<'b>(
    &mut self,
    shape: &impl Shape,
    transform: Affine,
    brush: impl Into<BrushRef<'b>>,
  ) {
    self.scene.fill(Fill::NonZero, transform, brush, None, shape);
  }

  pub fn stroke<'b>(
    &mut self,
    shape: &impl Shape,
    transform: Affine,
    brush: impl Into<BrushRef<'b>>,
    stroke: &Stroke,
  ) {
    self.scene.stroke(stroke, transform, brush, None, shape);
  }

  pub fn layout_text(&mut self, text: &DrawText) -> Layout<Brush> {
    let mut builder = self.layout.ranged_builder(&mut self.font, text.text, 1.0, true);

    builder.push_default(StyleProperty::FontSize(text.size));
    builder.push_default(StyleProperty::FontWeight(text.weight));
    builder.push_default(StyleProperty::Brush(text.brush.clone()));

    let mut layout = builder.build(text.text);
    layout.break_all_lines(None);
    layout.align(None, Alignment::Start, Default::default());
    layout
  }

  pub fn draw_text(&mut self, text: DrawText) {
    let layout = self.layout_text(&text);
    self.draw_text_layout(layout, text);
  }

  pub fn draw_text_layout(&mut self, layout: Layout<Brush>, text: DrawText) {
    let offset = Vec2::new(
      text.horizontal_align.offset(f64::from(layout.width())),
      text.vertical_align.offset(f64::from(layout.height())),
    );
    let transform =
      Affine::translate(text.position.to_vec2()) * text.transform * Affine::translate(-offset);

    for line in layout.lines() {
      for item in line.items() {
        let PositionedLayoutItem::GlyphRun(glyph_run) = item else { continue };

        let run = glyph_run.run();
        let mut x = glyph_run.offset();
        let baseline = glyph_run.baseline();

        self
          .scene
          .draw_glyphs(run.font())
          .brush(&glyph_run.style().brush)
          .transform(transform)
          .glyph_transform(
            run.synthesis().skew().map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0)),
          )
          .font_size(run.font_size())
          .normalized_coords(run.normalized_coords())
          .draw(
            Fill::NonZero,
            glyph_run.glyphs().map(|glyph| {
              let gx = x + glyph.x;
              let gy = baseline + glyph.y;
              x += glyph.advance;
              vello::Glyph { id: glyph.id.into(), x: gx, y: gy }
            }),
          );
      }
    }
  }
}

impl Align {
  /// How far the anchor sits from the start of a box of the given size.
  fn offset(self, size: f64) -> f64 {
    match self {
      Align::Start => 0.0,
      Align::Center => size / 2.0,
      Align::End => size,
    }
  }
}

impl GpuHandle {
  pub fn new(config: &RenderConfig) -> Result<Self> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter =
      pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
        .map_err(|e| VizuError::Gpu(format!("failed to create adapter: {e}")))?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
      label:             Some("vizu"),
      required_features: wgpu::Features::empty(),
      required_limits:   wgpu::Limits::defaults(),
      memory_hints:      wgpu::MemoryHints::MemoryUsage,
      ..Default::default()
    }))
    .map_err(|e| VizuError::Gpu(format!("failed to create device: {e}")))?;

    let texture = device.create_texture(&TextureDescriptor {
      label:           Some("Render Texture"),
      size:            config.extent_3d(),
      mip_level_count: 1,
      sample_count:    1,
      dimension:       wgpu::TextureDimension::D2,
      format:          wgpu::TextureFormat::Rgba8Unorm,
      usage:           wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
      view_formats:    &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    Ok(GpuHandle { device, queue, texture, view })
  }
}

impl FrameRenderer {
  pub fn new(config: RenderConfig) -> Result<Self> {
    config.validate()?;
    let handle = GpuHandle::new(&config)?;
    let vello = vello::Renderer::new(&handle.device, vello::RendererOptions::default())
      .map_err(|e| VizuError::Gpu(format!("failed to create renderer: {e}")))?;

    Ok(FrameRenderer { handle, vello, config })
  }

  pub fn rasterize(&mut self, render: &Render) -> Result<RgbaImage> {
    self
      .vello
      .render_to_texture(
        &self.handle.device,
        &self.handle.queue,
        &render.scene,
        &self.handle.view,
        &vello::RenderParams {
          base_color:          render.background,
          width:               self.config.width,
          height:              self.config.height,
          antialiasing_method: vello::AaConfig::Msaa16,
        },
      )
      .map_err(|e| VizuError::Gpu(format!("failed to render to a texture: {e}")))?;

    texture::read_rgba(&self.handle, self.config)
  }
}

impl RenderConfig {
  // Keeps the readback buffer and the GIF's u16 dimensions in range.
  const MAX_SIDE: u32 = 8192;

  pub fn validate(&self) -> Result<()> {
    for (name, side) in [("width", self.width), ("height", self.height)] {
      if side == 0 || side > Self::MAX_SIDE {
        return Err(VizuError::option(name, format!("must be in 1..={}", Self::MAX_SIDE)));
      }
    }
    Ok(())
  }

  fn extent_3d(&self) -> wgpu::Extent3d {
    wgpu::Extent3d {
      width:                 self.width,
      height:                self.height,
      depth_or_array_layers: 1,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn align_offsets() {
    assert_eq!(Align::Start.offset(40.0), 0.0);
    assert_eq!(Align::Center.offset(40.0), 20.0);
    assert_eq!(Align::End.offset(40.0), 40.0);
  }

  #[test]
  fn config_limits() {
    assert!(RenderConfig { width: 1200, height: 800 }.validate().is_ok());
    assert!(matches!(
      RenderConfig { width: 0, height: 800 }.validate(),
      Err(VizuError::InvalidOption { name: "width", .. })
    ));
    assert!(RenderConfig { width: 100, height: 10_000 }.validate().is_err());
  }
}
