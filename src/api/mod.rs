pub mod extract;
pub mod format;
pub mod pagination;
pub mod requests;

pub use extract::ValidatedJson;
pub use pagination::{PageMeta, PageParams, PageQuery};
