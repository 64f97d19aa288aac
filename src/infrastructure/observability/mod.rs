mod init_tracing;
mod log_sink;
mod log_sink_layer;
mod request_id;
mod tracing_config;

pub use init_tracing::init_tracing;
pub use log_sink::{DEFAULT_SINK_CAPACITY, LogSink};
pub use log_sink_layer::LogSinkLayer;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use tracing_config::TracingConfig;
