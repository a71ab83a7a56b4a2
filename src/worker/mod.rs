pub mod cycle;
pub mod job_worker;
pub mod pipeline;

pub use cycle::{CycleRunner, Trigger};
pub use job_worker::JobWorker;
pub use pipeline::Pipeline;
