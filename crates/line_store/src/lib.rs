mod error;
mod schema;
mod store;

pub use error::LineStoreError;
pub use schema::{Line, LineId, LineMetadata, LineType};
pub use store::LineStore;
