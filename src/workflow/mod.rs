//! Workflow descriptor model, validation, and registry encoding
//!
//! This module owns the canonical shape of an automation intent. The
//! classifier's loosely-typed payload enters through [`validator::validate`],
//! becomes a [`WorkflowDescriptor`], and leaves through [`encoder::encode`]
//! as the exact parameter tuple the registry contract expects. There is one
//! canonical model and one encoder; the wire shape never varies per code path.

pub mod descriptor;
pub mod encoder;
pub mod validator;

pub use descriptor::{ActionType, WorkflowDescriptor, NATIVE_TOKEN};
pub use encoder::{decode, encode, EncodedAction};
pub use validator::validate;
