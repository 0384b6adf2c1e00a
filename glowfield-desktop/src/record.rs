//! Headless rendering to a sequence of PNG files.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;

use glowfield::camera::DEFAULT_SCENE_SIZE;
use glowfield::renderer::Renderer;

/// Options for `glowfield record`.
#[derive(Debug, clap::Args)]
pub struct RecordOptions {
    /// Output image width in pixels.
    #[arg(long, default_value_t = DEFAULT_SCENE_SIZE[0])]
    pub width: u32,

    /// Output image height in pixels.
    #[arg(long, default_value_t = DEFAULT_SCENE_SIZE[1])]
    pub height: u32,

    /// Number of frames to render.
    #[arg(long, default_value_t = 1)]
    pub frames: u32,

    /// Seconds of scene time to advance between frames.
    #[arg(long, default_value_t = 0.1)]
    pub frame_step: f32,

    /// Directory the PNG frames are written into (created if absent).
    #[arg(long, default_value = "frames")]
    pub output: PathBuf,
}

pub fn record_main(options: &RecordOptions) -> anyhow::Result<()> {
    std::fs::create_dir_all(&options.output).with_context(|| {
        format!("failed to create output directory {}", options.output.display())
    })?;

    let mut renderer = Renderer::new(Box::new(glowfield::demo::build_scene));
    renderer.resize(options.width, options.height);

    let progress = indicatif::ProgressBar::new(u64::from(options.frames))
        .with_style(progress_style())
        .with_prefix("Frames");

    for frame_number in 0..options.frames {
        renderer.update(options.frame_step);
        renderer.render_frame();
        while !renderer.is_done() {
            thread::sleep(Duration::from_millis(1));
        }

        let path = options.output.join(format!("frame-{frame_number:04}.png"));
        write_png(
            &path,
            options.width,
            options.height,
            &renderer.frame().to_rgba8(),
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        progress.inc(1);
    }
    progress.finish();

    log::info!(
        "wrote {} frame(s) to {}",
        options.frames,
        options.output.display()
    );
    Ok(())
}

fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_srgb(png::SrgbRenderingIntent::Perceptual);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()?;
    Ok(())
}

fn progress_style() -> indicatif::ProgressStyle {
    #![allow(clippy::literal_string_with_formatting_args)]
    indicatif::ProgressStyle::default_bar()
        .template("{prefix:8} [{elapsed}] {wide_bar} {pos:>6}/{len:6}")
        .unwrap()
}
