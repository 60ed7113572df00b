/*!
 * XLIFF document handling.
 *
 * - `version`: dialect detection and per-dialect element names
 * - `tree`: lossless XML tree used for extraction and reinsertion
 * - `cluster`: splitting documents into size-bounded parseable fragments
 * - `segments`: source/target access inside translation units
 * - `assembler`: joining translated fragments and declaring the target language
 */

pub mod assembler;
pub mod cluster;
pub mod segments;
pub mod tree;
pub mod version;

pub use assembler::{assemble, extract_cluster_body, patch_target_language};
pub use cluster::{cluster_units, Cluster, RawUnit, SplitDocument};
pub use tree::{parse, pretty_print, Element, Node, XmlDocument};
pub use version::XliffVersion;
