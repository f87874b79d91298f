//! Render pipeline: customize, composite, encode and thumbnail under one scratch directory.

pub mod render_session;
pub mod scratch;

pub use render_session::{
    NoopObserver, RenderObserver, RenderRecord, RenderSession, RenderStage, RenderStatus,
    SessionOpts,
};
pub use scratch::ScratchDir;
