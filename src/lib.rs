#[macro_use]
mod macros;

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod notify;
pub mod query;
pub mod remote;
pub mod types;
pub mod view;

pub use app::{App, StatsCache};
pub use config::Config;
pub use error::{Result, TrackerError};
pub use events::{InvalidationReceiver, InvalidationSignal};
pub use notify::{Notifier, Toast, ToastLevel, ToastSnapshot};
pub use query::{PageQuery, SortField, SortOrder};
pub use remote::{HttpStore, InMemoryStore, PageRequest, PageResult, RemoteStore};
pub use types::{
    Difficulty, FieldUpdate, Fragment, ProgressStats, QuestionId, Record, RecordPatch, ViewKey,
};
pub use view::{CollectionView, FetchOutcome, Pending, ViewSnapshot, WriteOutcome};
