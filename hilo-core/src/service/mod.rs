pub mod errors;
pub mod poller;
pub mod source;

pub use errors::ServiceError;
pub use poller::{PollOutcome, Poller};
pub use source::{JsonFileSource, ObservationSource};
