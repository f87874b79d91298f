use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::foundation::core::{FrameIndex, Resolution};
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::render::config::RenderConfig;
use crate::render::cpu::FrameRenderer;
use crate::scene::model::Template;

/// Environment variable overriding [`CompositorOpts::threads`].
pub const THREADS_ENV: &str = "CLIPFORGE_THREADS";
/// Environment variable overriding [`CompositorOpts::default_font`].
pub const DEFAULT_FONT_ENV: &str = "CLIPFORGE_DEFAULT_FONT";

#[derive(Clone, Debug)]
/// Threading and font controls for frame compositing.
pub struct CompositorOpts {
    /// Render frames on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
    /// Frames scheduled per parallel batch. A failing batch stops the render.
    pub chunk_size: usize,
    /// TTF/OTF file registered as the fallback font before `sans-serif`.
    pub default_font: Option<PathBuf>,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            chunk_size: 64,
            default_font: None,
        }
    }
}

impl CompositorOpts {
    /// Defaults with `CLIPFORGE_THREADS` / `CLIPFORGE_DEFAULT_FONT` applied.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(n) = std::env::var(THREADS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            opts.threads = Some(n);
        }
        if let Some(p) = std::env::var_os(DEFAULT_FONT_ENV).filter(|v| !v.is_empty()) {
            opts.default_font = Some(PathBuf::from(p));
        }
        opts
    }
}

/// One planned frame: its absolute index and the scene it shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameJob {
    pub index: FrameIndex,
    pub scene_index: usize,
}

/// A frame image written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameArtifact {
    pub index: FrameIndex,
    pub scene_index: usize,
    pub path: PathBuf,
}

/// Ordered frames of one render plus the timing they were produced for.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    pub frames: Vec<FrameArtifact>,
    pub dir: PathBuf,
    pub fps: u32,
    pub resolution: Resolution,
    /// Sum of scene durations, in seconds.
    pub total_duration: f64,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(|f| f.path.as_path())
    }
}

/// Number of frames a scene of `duration` seconds gets at `fps`.
pub fn frames_for_duration(duration: f64, fps: u32) -> u64 {
    let n = (duration * f64::from(fps)).round();
    if n.is_finite() && n > 0.0 { n as u64 } else { 0 }
}

/// Expand the scene list into per-frame jobs, numbering frames across scenes.
pub fn plan_frames(template: &Template, fps: u32) -> Vec<FrameJob> {
    let mut jobs = Vec::new();
    let mut next = 0u64;
    for (scene_index, scene) in template.scenes.iter().enumerate() {
        for _ in 0..frames_for_duration(scene.duration, fps) {
            jobs.push(FrameJob {
                index: FrameIndex(next),
                scene_index,
            });
            next += 1;
        }
    }
    jobs
}

/// Rasterize every frame of `template` into `out_dir` as `frame_NNNNNN.png`.
///
/// All frames of a scene show its static element layout; animations are not evaluated.
#[tracing::instrument(skip_all, fields(scenes = template.scenes.len(), fps = config.fps))]
pub fn composite(
    template: &Template,
    config: &RenderConfig,
    opts: &CompositorOpts,
    out_dir: &Path,
) -> ClipforgeResult<FrameSequence> {
    template.check_structure()?;
    if config.fps == 0 {
        return Err(ClipforgeError::composition("fps must be > 0"));
    }

    let resolution = config.resolution();
    let jobs = plan_frames(template, config.fps);
    if jobs.is_empty() {
        return Err(ClipforgeError::composition("no frames generated"));
    }
    std::fs::create_dir_all(out_dir).map_err(|e| {
        ClipforgeError::io(format!("create frame dir '{}': {e}", out_dir.display()))
    })?;

    tracing::debug!(frames = jobs.len(), %resolution, "compositing frames");
    let default_font = opts.default_font.as_deref();

    let frames = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        let chunk_size = opts.chunk_size.max(1);
        let mut out = Vec::with_capacity(jobs.len());
        for chunk in jobs.chunks(chunk_size) {
            let rendered = pool.install(|| {
                chunk
                    .par_iter()
                    .map_init(
                        || FrameRenderer::new(resolution, default_font),
                        |renderer, job| -> ClipforgeResult<FrameArtifact> {
                            let renderer = renderer
                                .as_mut()
                                .map_err(|e| ClipforgeError::composition(e.to_string()))?;
                            render_job(renderer, template, job, out_dir)
                        },
                    )
                    .collect::<Vec<_>>()
            });
            for item in rendered {
                out.push(item?);
            }
        }
        out
    } else {
        let mut renderer = FrameRenderer::new(resolution, default_font)?;
        jobs.iter()
            .map(|job| render_job(&mut renderer, template, job, out_dir))
            .collect::<ClipforgeResult<Vec<_>>>()?
    };

    Ok(FrameSequence {
        frames,
        dir: out_dir.to_path_buf(),
        fps: config.fps,
        resolution,
        total_duration: template.total_scene_duration(),
    })
}

fn render_job(
    renderer: &mut FrameRenderer,
    template: &Template,
    job: &FrameJob,
    out_dir: &Path,
) -> ClipforgeResult<FrameArtifact> {
    let scene = template.scenes.get(job.scene_index).ok_or_else(|| {
        ClipforgeError::composition(format!("scene index {} out of range", job.scene_index))
    })?;
    let path = out_dir.join(job.index.file_name());
    renderer.render_to_png(scene, &path)?;
    Ok(FrameArtifact {
        index: job.index,
        scene_index: job.scene_index,
        path,
    })
}

fn build_thread_pool(threads: Option<usize>) -> ClipforgeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ClipforgeError::validation(
            "compositor 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ClipforgeError::composition(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
