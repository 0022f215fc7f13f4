//! Session state for the test editor: the authoring draft, the disposable
//! exam-simulation preview, and the answer capture that only exists inside a
//! preview.

pub mod answers;
pub mod authoring;
pub mod countdown;
pub mod preview;

pub use authoring::{SessionState, TestAuthoringSession};
pub use preview::{PreviewPhase, PreviewSession};
