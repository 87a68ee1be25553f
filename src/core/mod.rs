//! Operation lifecycle, reporting, and tracking.

pub mod error;
pub mod id;
pub mod operation;
pub mod registry;
pub mod state;
pub mod status;
pub mod timing;
pub mod work;

pub use error::{AppResult, OperationFailure, RegistryError, GENERIC_FAILURE_CODE};
pub use id::{OperationId, OPERATION_ID_PREFIX};
pub use operation::{Operation, PendingOperation};
pub use registry::OperationRegistry;
pub use state::{OperationState, UnknownState};
pub use status::OperationStatus;
pub use timing::{ExecutionProbe, ExecutionTiming, ProbeReading};
pub use work::{OperationWork, WorkResult};
