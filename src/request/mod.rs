//! Declarative request description.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TargetType`] | Capability a call site implements per API operation |
//! | [`TaskType`] | Body/query shape of a request |
//! | [`MultipartFormData`] | Multipart body with a random boundary |
//! | [`EndPoint`] | Resolved descriptor; materializes a [`WireRequest`] |

pub mod endpoint;
pub mod multipart;
pub mod target;
pub mod task;

pub use endpoint::{EndPoint, WireRequest};
pub use multipart::{BodyPart, BoundaryGenerator, BoundaryType, MultipartFormData, PartContent};
pub use target::{StubResponse, TargetType};
pub use task::{Encodable, JsonEncoder, KeyEncodingStrategy, TaskType};
