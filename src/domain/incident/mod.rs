// Incident domain module
// The reported problem and its deadline, validated on construction

pub mod request;

pub use request::{IncidentRequest, ValidationError};
