//! # Nightshade Renderer
//!
//! Background render dispatcher. A render request captures the appearance in
//! effect when it is issued, runs the slow procedural drawing on a worker
//! pool, and posts the finished image back onto the UI queue.
//!
//! Each [`RenderTarget`] carries a generation counter. Issuing a new request
//! supersedes the one in flight, and results for older generations are
//! dropped on delivery, so the last request wins regardless of which pass
//! finishes first.

pub mod dispatcher;
pub mod pool;
pub mod raster;
pub mod request;
pub mod target;
pub mod ui;

pub use dispatcher::{Dispatcher, RenderHost};
pub use pool::WorkerPool;
pub use raster::{render_pass, Canvas, PassOutcome};
pub use request::RenderRequest;
pub use target::{
    ActivityIndicator, RenderEvent, RenderHandle, RenderSpec, RenderState, RenderTarget, TargetId,
};
pub use ui::{UiQueue, UiSender};
