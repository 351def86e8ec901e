//! Domain entities for per-user project graphs.
//!
//! # Core Concepts
//!
//! ## Decoded Entities
//!
//! Every entity here is produced by [`crate::decode`], either from a fetched
//! payload or from a server's echoed create response. None of them is mutated
//! after construction; a newer state of the same project is a new decode.
//!
//! - [`CoreProject`]: Identity, essential info, priorities, measured goals and
//!   the time the project needs.
//! - [`Project`]: A [`CoreProject`] plus the optional list of parent projects.
//! - [`MeasuredGoal`]: A weighted goal with real and discrete progress, and the
//!   [`Failure`] notes recorded against it.
//! - [`MeasuredSet`]: A fixed set of named quantities of one scalar type.
//! - [`PriorityRef`]: A priority tag, resolved either inline or through the
//!   main user's [`PriorityCatalog`].
//! - [`UserProfile`]: The main user's personal info, source of the catalog.
//!
//! ## Write Inputs
//!
//! [`NewProject`], [`NewMeasuredGoal`] and [`NewFailure`] carry the validated
//! primitive values a caller sends to [`crate::writer::ProjectsWriter`].

mod goal;
mod measured;
mod priority;
mod project;
mod user;

pub use goal::*;
pub use measured::*;
pub use priority::*;
pub use project::*;
pub use user::*;
