/// Integration guides for the Lytics Rust SDK.
///
/// Each sub-module contains a standalone guide rendered from Markdown.
///
/// # Available Guides
///
/// | Guide | Description |
/// |-------|-------------|
/// | [`error_handling`] | Error variants, absent objects versus failures, and matching on statuses |
/// | [`entity_fragments`] | Fetching fragments, key-set hashing, and rendering fragment graphs |

/// Error variant reference, `Ok(None)` lookups, boolean deletes, and
/// handling rejected API keys.
#[doc = include_str!("../docs/guides/error-handling.md")]
pub mod error_handling {}

/// Entity fragments, canonical key-set hashes, and Graphviz output.
#[doc = include_str!("../docs/guides/entity-fragments.md")]
pub mod entity_fragments {}
