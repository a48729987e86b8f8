//! Client side of the poster manager: picks poster candidates for media items, keeps the
//! pending selections of one browsing session and uploads them one by one or in batch.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
pub mod render;
pub mod selection;
pub mod session;
pub mod view;

pub use api::{HttpPosterApi, PosterApi};
pub use config::{load_settings, ClientSettings};
pub use controller::{AlwaysConfirm, BatchOutcome, Confirm, WorkflowController};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use session::{BrowseQuery, SessionContext};
pub use view::ItemStatus;
