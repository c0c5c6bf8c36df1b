pub mod config;
pub mod consts;
pub mod error;
pub mod features;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod reduce;
pub mod series;
pub mod table;
pub mod traversal;
