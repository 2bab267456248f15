//! Stencil abstraction and traversal engine for Eddy.
//!
//! Two capabilities cover every per-cell operator in the solver:
//!
//! - [`FieldStencil`]: interior update. Reads a fixed-radius neighbourhood
//!   and writes only the visited cell of its destination field.
//! - [`BoundaryStencil`]: update at one named [`Wall`]. Buffer fill/read
//!   stencils and physical boundary conditions both implement it.
//!
//! Traversals are deterministic and visit cells in `k, j, i` order:
//!
//! - [`FieldIterator`]: the interior, widened or narrowed by offsets
//! - [`GhostLayerIterator`]: the cells adjacent to each inter-rank face
//! - [`GlobalBoundaryIterator`]: the cells adjacent to each global wall

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod iterator;
pub mod stencil;

pub use context::{FlowParameters, StencilContext};
pub use eddy_grid::Cell;
pub use iterator::{face_span, FieldIterator, GhostLayerIterator, GlobalBoundaryIterator};
pub use stencil::{BoundaryStencil, FieldStencil, Wall};
