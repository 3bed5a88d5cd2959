//! Rename TV episode files to a canonical, sortable layout.
//!
//! Filenames are matched against the episode list of a show fetched from a
//! [`catalog::Catalog`], and every match is turned into a destination of the
//! form `{dest}/{show}/season_{SS}/{show}-{tag}-{episode}{ext}`.

pub mod catalog;
pub mod error;
pub mod index;
pub mod naming;
pub mod plan;
pub mod tvmaze;
pub mod video;
