pub mod backend;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod session;

pub use backend::{Backend, DispatchRequest, DocumentUpload, HttpBackend};
pub use commands::{CommandOutcome, ModeCommand};
pub use config::{load_settings, ClientSettings};
pub use controller::{ControllerEvent, ModeController};
pub use error::{ConfigError, DispatchError, DispatchErrorKind, SubmitError, ValidationError};
pub use session::{Drafts, HistoryLog, ModeResponses, SessionSnapshot};
