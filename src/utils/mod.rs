pub mod date;
pub mod formatting;
pub mod path;
pub mod table;

pub use formatting::{format_altitude, format_distance, format_pace, format_seconds};
pub use path::{sanitize_source_name, validate_safe_path};
