//! NGFF (OME-Zarr) attribute reading.
//!
//! The Zarr front end never touches chunk data: everything the companion
//! file needs lives in the JSON sidecars — `.zattrs` documents at the store
//! root and at well/image sub-paths, and the `.zarray` document of the
//! full-resolution dataset for shape and dtype.

mod companion;
mod metadata;
mod store;

pub use companion::{zarr_companion, ZarrCompanion};
pub use metadata::{
    pixel_type_from_dtype, ArrayMeta, Axis, Dataset, FieldImage, Multiscale, PlateAttrs,
    PlateName, PlateWellEntry, RootAttrs, WellAttrs,
};
pub use store::DirectoryStore;
