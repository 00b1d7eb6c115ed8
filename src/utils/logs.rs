use crate::core::library::{LibraryError, LibraryResult};

// installs the json subscriber for CloudWatch friendly logs; fails if a global
// subscriber was already installed
pub fn setup_tracing() -> LibraryResult<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // ANSI color codes show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // CloudWatch adds the ingestion time.
        .without_time()
        .json()
        .try_init()
        .map_err(|err| LibraryError::runtime(
            format!("failed to setup tracing {}", err).as_str(), None))
}
