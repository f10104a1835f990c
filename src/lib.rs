pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod output;
pub mod registry;
pub mod source;
pub mod writer;

pub use dispatcher::{Dispatcher, DispatcherState, RunReport};
pub use error::{Error, Result, UrlError};
pub use fetcher::{FetchOutcome, Fetcher};
pub use metrics::collector::MetricsCollector;
pub use metrics::snapshot::MetricsSnapshot;
pub use registry::{HostRegistry, Reservation};
pub use writer::{ResponseWriter, SavedResponse};
