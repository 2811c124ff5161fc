//! Core library for the Broadcast Switcher application.
//!
//! The crate holds the preview/program switcher state machine. Each module
//! owns one concern (field values, overlay and video selection, scene
//! memories, hotkeys) and the [`Switcher`] controller wires them together.
//! Peripherals such as storage, camera devices and the rendering surface are
//! reached through traits so the controller runs without any UI.

pub mod camera;
pub mod config;
pub mod error;
pub mod fields;
pub mod hotkey;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod scope;
pub mod storage;
pub mod switcher;
pub mod theme;
pub mod timeline;
pub mod video;

pub use camera::{CameraError, CameraService, CameraStream, NoCamera};
pub use config::{AppConfig, CueConfig};
pub use error::{Result, SwitcherError};
pub use fields::{FieldMap, FieldRegistry, TextUpdate};
pub use hotkey::{Action, Dispatch, Focus, HotkeyMap, Key, KeyPress, Modifiers};
pub use overlay::{CuePhase, OverlayState, OverlayVariant};
pub use render::{RenderSurface, Surface, SurfaceUpdate};
pub use scene::{SceneSlot, SceneStore, Snapshot, SLOT_COUNT};
pub use scope::Scope;
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use switcher::Switcher;
pub use theme::Theme;
pub use timeline::{ScheduledEvent, Scheduler, SwitchClock};
pub use video::{VideoSource, VideoState};
