mod allowed;
mod indexed;

pub use allowed::{AllowedOffsets, NORMAL_SENTENCE};
pub use indexed::{IndexState, IndexedAnnotations};
