use crate::customize::merge::customize_validated;
use crate::customize::request::CustomizationRequest;
use crate::encode::orchestrator::{
    ArtifactFormat, EncodeOutcome, EncoderOpts, EncoderOrchestrator,
};
use crate::foundation::core::Resolution;
use crate::foundation::error::{ClipforgeError, ClipforgeResult};
use crate::render::compositor::{CompositorOpts, composite};
use crate::render::config::RenderConfig;
use crate::scene::model::Template;
use crate::session::scratch::ScratchDir;
use crate::thumbnail::{ThumbnailExtractor, ThumbnailOpts};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Environment variable overriding [`SessionOpts::scratch_root`].
pub const SCRATCH_DIR_ENV: &str = "CLIPFORGE_SCRATCH_DIR";

/// Artifacts above this size are reported, not rejected.
const LARGE_ARTIFACT_BYTES: u64 = 100 * 1024 * 1024;

/// Externally observable pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Pipeline step reported while a render is `Processing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStage {
    Compositing,
    Encoding,
    Thumbnail,
}

/// Hooks for callers that persist status or drive progress notifications.
///
/// Callbacks run synchronously on the rendering thread.
pub trait RenderObserver: Send + Sync {
    fn on_status(&self, _render_id: Uuid, _status: RenderStatus) {}
    fn on_stage(&self, _render_id: Uuid, _stage: RenderStage) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RenderObserver for NoopObserver {}

/// Outcome record handed to the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderRecord {
    pub render_id: Uuid,
    pub status: RenderStatus,
    pub output_path: PathBuf,
    pub format: ArtifactFormat,
    /// Seconds; sum of rendered scene durations.
    pub duration: f64,
    pub file_size: u64,
    pub resolution: Resolution,
    pub fps: u32,
    pub frame_count: usize,
    pub quality: String,
    pub thumbnail_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Non-fatal findings from validation and config checks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Pipeline settings.
#[derive(Clone, Debug)]
pub struct SessionOpts {
    /// Parent of every per-render scratch directory.
    pub scratch_root: PathBuf,
    pub compositor: CompositorOpts,
    pub encoder: EncoderOpts,
    pub thumbnail: ThumbnailOpts,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir(),
            compositor: CompositorOpts::default(),
            encoder: EncoderOpts::default(),
            thumbnail: ThumbnailOpts::default(),
        }
    }
}

impl SessionOpts {
    /// Defaults overlaid with the `CLIPFORGE_*` environment variables.
    pub fn from_env() -> Self {
        let encoder = EncoderOpts::from_env();
        let thumbnail = ThumbnailOpts {
            ffmpeg_bin: encoder.ffmpeg_bin.clone(),
            ..ThumbnailOpts::default()
        };
        let scratch_root = std::env::var_os(SCRATCH_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        Self {
            scratch_root,
            compositor: CompositorOpts::from_env(),
            encoder,
            thumbnail,
        }
    }
}

/// Runs derived scene graphs through compositing, encoding and thumbnail extraction.
///
/// A session holds no per-render state; one instance can serve concurrent renders from several
/// threads, each isolated in its own scratch directory.
pub struct RenderSession {
    opts: SessionOpts,
    encoder: EncoderOrchestrator,
    thumbnails: ThumbnailExtractor,
    observer: Arc<dyn RenderObserver>,
}

impl RenderSession {
    /// Session with the default ffmpeg strategies built from `opts`.
    pub fn new(opts: SessionOpts) -> Self {
        let encoder = EncoderOrchestrator::new(opts.encoder.clone());
        let thumbnails = ThumbnailExtractor::new(opts.thumbnail.clone());
        Self::with_components(opts, encoder, thumbnails)
    }

    /// Session with explicitly supplied collaborators.
    pub fn with_components(
        opts: SessionOpts,
        encoder: EncoderOrchestrator,
        thumbnails: ThumbnailExtractor,
    ) -> Self {
        Self {
            opts,
            encoder,
            thumbnails,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RenderObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Validate and apply `req`, then render the derived graph.
    ///
    /// `config` defaults to [`RenderConfig::for_template`] of the derived graph. A rejected
    /// customization returns [`ClipforgeError::Rejected`] before any status is emitted.
    pub fn render_customized(
        &self,
        template: &Template,
        req: &CustomizationRequest,
        config: Option<RenderConfig>,
        output_path: &Path,
    ) -> ClipforgeResult<RenderRecord> {
        let customized = customize_validated(template, req)?;
        let config = config.unwrap_or_else(|| RenderConfig::for_template(&customized.template));
        let record = self.render(&customized.template, &config, output_path)?;
        Ok(prepend_warnings(record, customized.report.warning_messages()))
    }

    /// Render an already-derived graph to `output_path`.
    ///
    /// Emits `queued`, then `processing`, then exactly one of `completed` / `failed`. A graph
    /// that fails [`Template::validate`] is returned as [`ClipforgeError::Rejected`] and invalid
    /// render settings as [`ClipforgeError::Validation`], both before any status is emitted.
    /// Scratch files are removed on every path.
    #[tracing::instrument(skip_all, fields(output = %output_path.display()))]
    pub fn render(
        &self,
        derived: &Template,
        config: &RenderConfig,
        output_path: &Path,
    ) -> ClipforgeResult<RenderRecord> {
        let graph_report = derived.validate();
        if !graph_report.is_valid {
            tracing::info!(errors = graph_report.errors.len(), "scene graph rejected");
            return Err(ClipforgeError::Rejected(graph_report));
        }
        let report = config.check();
        if !report.is_valid {
            return Err(ClipforgeError::validation(format!(
                "invalid render config: {report}"
            )));
        }

        let render_id = Uuid::new_v4();
        self.observer.on_status(render_id, RenderStatus::Queued);

        self.observer.on_status(render_id, RenderStatus::Processing);
        tracing::info!(%render_id, fps = config.fps, aspect = %config.aspect_ratio, "render started");

        match self.run(render_id, derived, config, output_path) {
            Ok(mut record) => {
                record.warnings.extend(
                    graph_report
                        .warning_messages()
                        .chain(report.warning_messages())
                        .map(str::to_owned),
                );
                self.observer.on_status(render_id, RenderStatus::Completed);
                tracing::info!(
                    %render_id,
                    format = record.format.as_str(),
                    frames = record.frame_count,
                    "render completed"
                );
                Ok(record)
            }
            Err(e) => {
                self.observer.on_status(render_id, RenderStatus::Failed);
                tracing::error!(%render_id, "render failed: {e}");
                Err(e)
            }
        }
    }

    fn run(
        &self,
        render_id: Uuid,
        derived: &Template,
        config: &RenderConfig,
        output_path: &Path,
    ) -> ClipforgeResult<RenderRecord> {
        let scratch = ScratchDir::create(&self.opts.scratch_root, render_id)?;

        let encoded = self.composite_and_encode(render_id, &scratch, derived, config, output_path);
        scratch.close();
        let outcome = encoded?;

        let file_size = check_artifact(&outcome.output_path)?;

        self.observer.on_stage(render_id, RenderStage::Thumbnail);
        let thumb = self.thumbnails.extract(&outcome.output_path, outcome.format);

        Ok(record_from(
            render_id, outcome, file_size, config, thumb.thumbnail_path,
        ))
    }

    fn composite_and_encode(
        &self,
        render_id: Uuid,
        scratch: &ScratchDir,
        derived: &Template,
        config: &RenderConfig,
        output_path: &Path,
    ) -> ClipforgeResult<EncodeOutcome> {
        self.observer.on_stage(render_id, RenderStage::Compositing);
        let frames = composite(
            derived,
            config,
            &self.opts.compositor,
            &scratch.frames_dir(),
        )?;

        self.observer.on_stage(render_id, RenderStage::Encoding);
        self.encoder.encode(&frames, output_path, scratch.path())
    }
}

fn prepend_warnings<'a>(
    mut record: RenderRecord,
    warnings: impl Iterator<Item = &'a str>,
) -> RenderRecord {
    let mut all: Vec<String> = warnings
        .filter(|w| !record.warnings.iter().any(|r| r == w))
        .map(str::to_owned)
        .collect();
    all.append(&mut record.warnings);
    record.warnings = all;
    record
}

fn record_from(
    render_id: Uuid,
    outcome: EncodeOutcome,
    file_size: u64,
    config: &RenderConfig,
    thumbnail_path: Option<PathBuf>,
) -> RenderRecord {
    RenderRecord {
        render_id,
        status: RenderStatus::Completed,
        output_path: outcome.output_path,
        format: outcome.format,
        duration: outcome.metadata.duration,
        file_size,
        resolution: outcome.metadata.resolution,
        fps: outcome.metadata.fps,
        frame_count: outcome.metadata.frame_count,
        quality: config.quality.clone(),
        thumbnail_path,
        message: outcome.message,
        warnings: Vec::new(),
    }
}

/// Size of the finished artifact; a missing or empty file fails the render.
fn check_artifact(path: &Path) -> ClipforgeResult<u64> {
    let meta = std::fs::metadata(path).map_err(|e| {
        ClipforgeError::io(format!("output artifact '{}' is missing: {e}", path.display()))
    })?;
    if meta.len() == 0 {
        return Err(ClipforgeError::io(format!(
            "output artifact '{}' is empty",
            path.display()
        )));
    }
    if meta.len() > LARGE_ARTIFACT_BYTES {
        tracing::warn!(bytes = meta.len(), path = %path.display(), "output artifact is unusually large");
    }
    Ok(meta.len())
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
