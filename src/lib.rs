pub mod db;
pub mod dump;
pub mod import;
pub mod merge;
pub mod popularity;
pub mod remap;
pub mod slug;
pub mod sqlgen;
