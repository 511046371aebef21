//! HTTP adapter - Static keyboard assets and directory listings.
//!
//! Files are served straight from the configured root. Directories
//! without an `index.html`, and missing paths, fall through to the
//! listing handler which renders a navigation page or a 404.

pub mod listing;
pub mod static_site;

pub use listing::{list_directory, DirEntryView, ListingOptions};
pub use static_site::{static_router, BridgeStatus, StaticSiteState};
