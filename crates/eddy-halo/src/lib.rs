//! Ghost-layer exchange between ranks holding adjacent subdomains.
//!
//! One exchange of a [`HaloKind`] runs in three stages:
//!
//! 1. [`BufferFillStencil`] packs the cells next to every face that has a
//!    neighbour into that face's send [`GhostBuffer`].
//! 2. Axis by axis (x, then y, then z) the buffers of each face pair are
//!    traded with the two neighbours over a [`Communicator`].
//! 3. [`BufferReadStencil`] unpacks every received buffer into the ghost
//!    cells of the matching face.
//!
//! Which layers and components a face carries, and therefore every buffer
//! length, is decided in one place: [`FacePlan`]. The fill plan of a face
//! and the read plan of the opposite face always agree.
//!
//! Corner ghost cells are never sent directly. A face's tangential span
//! includes the ghost cells of the axes exchanged before it, so running an
//! exchange twice carries corner values across two hops.
//! [`ParallelManager`] is the entry point the timestep loop uses.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod comm;
pub mod geometry;
pub mod kind;
pub mod local;
pub mod manager;
pub mod stencils;

pub use buffer::GhostBuffer;
pub use comm::{Communicator, SerialComm};
pub use geometry::{Components, FacePlan, LayerCopy};
pub use kind::HaloKind;
pub use local::LocalComm;
pub use manager::{ExchangeMode, ExchangeStats, ParallelManager};
pub use stencils::{BufferFillStencil, BufferReadStencil};
