use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error("Failed to open dataset {path:?}: {source}")]
    DataSourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unreadable bytes or a record with the wrong number of fields.
    #[error("Malformed dataset record: {0}")]
    DataSource(#[from] csv::Error),

    #[error("No venues found in area '{area}'")]
    EmptySelection { area: String },

    /// The address came from the option list, so a miss means the option list
    /// and the dataset are out of sync.
    #[error("Address '{address}' is offered for selection but matches no venue")]
    LookupInvariant { address: String },

    #[error("Invalid {axis} range [{min}, {max}]: must satisfy {lo} <= min <= max <= {hi}")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
        lo: f64,
        hi: f64,
    },
}
