//! Blend controller core (engine-agnostic).
//!
//! Manages the weights of a fixed catalog of skeletal animation clips: base
//! tracks are switched by warped crossfades that wait for the outgoing clip's
//! loop boundary (except from `idle`), additive tracks are weighted
//! independently. A host loads clip metadata once per model, sends requests,
//! calls `tick` every frame and reads per-track samples back.

pub mod action;
pub mod config;
pub mod controller;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod weights;

pub use action::{ActionHandle, Ramp, TrackEntry};
pub use config::Config;
pub use controller::{BlendController, ClipInfo, LoadReport};
pub use error::BlendError;
pub use ids::{Generation, TrackId};
pub use inputs::{BlendCommand, Inputs};
pub use outputs::{BlendEvent, Outputs, PanelRow, PanelState, TrackSample};
pub use registry::{ClipRegistry, RegistryConfig, RegistryEntry, TrackDefault, TrackGroup};
pub use scheduler::RequestOutcome;
pub use state::{ActiveBase, BlendState, PendingTransition, IDLE_TRACK};
pub use weights::set_weight;

/// Result alias for the fallible boundaries (config, registry, clip loading).
pub type Result<T> = core::result::Result<T, BlendError>;
