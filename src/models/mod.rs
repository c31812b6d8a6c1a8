pub mod lap;
pub mod lenient;
pub mod record;
pub mod summary;
pub mod trackpoint;

pub use lap::LapRecord;
pub use record::{Mode, PersistedRecord, RecordBatch, RecordKind};
pub use summary::FileSummary;
pub use trackpoint::TrackpointRecord;
