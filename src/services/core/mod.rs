pub mod cancel;
pub mod job_runner;
pub mod operation_lock;
pub mod scratch;

pub use cancel::CancelToken;
pub use job_runner::{JobContext, JobEvent, JobHandle, JobOutcome, JobRunner};
pub use operation_lock::{JobKind, OperationLock};
pub use scratch::ScratchSpace;
