//! Scene graphs and the concepts they are built from.
//!
//! Parsing captions into graphs happens outside this crate; these types are
//! the boundary where parsed objects, attributes and relations enter scoring.

pub mod concept;
pub mod scene;

pub use concept::{Concept, SenseId};
pub use scene::{ObjectId, SceneGraph};
