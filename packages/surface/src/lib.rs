//! # Folio Surface
//!
//! The boundary between a rendered editor and the Folio model.
//!
//! A renderer marks up its output so every rendered leaf can be traced back
//! to a model text:
//!
//! ```text
//! <div data-key="b1">                          block
//!   <span data-key="t1">                       text
//!     <span data-offset-key="t1:0">Hello</span>     leaf 0
//!     <span data-offset-key="t1:1"><b>!</b></span>  leaf 1
//!   </span>
//! </div>
//! ```
//!
//! The [`Surface`] is a read-only snapshot of that markup. The resolver maps
//! carets on it to model [`Point`](folio_model::Point)s, and points back to
//! carets. A surface must be paired with the value it was rendered from.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_surface::{find_point, ResolveOptions, Surface};
//!
//! let surface = Surface::build(&rendered);
//! let point = find_point(&surface, node, offset, &value, &ResolveOptions::default());
//! ```

pub mod error;
pub mod offset_key;
pub mod resolver;
pub mod surface;

pub use error::{SurfaceError, SurfaceResult};
pub use offset_key::{OffsetKey, SurfaceMarkers};
pub use resolver::{find_point, find_range, find_surface_point, ResolveOptions};
pub use surface::{Surface, SurfaceData, SurfaceNode, SurfaceNodeId};
