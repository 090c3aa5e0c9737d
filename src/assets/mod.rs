//! Asset root selection and path resolution

mod path;
mod root;

pub use path::normalize_request_path;
pub use root::{select_asset_root, AssetRoot, LoadedFile, ResolveError};
