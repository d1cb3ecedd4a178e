/// Object store access for citation links.
///
/// Only read links are produced here; uploading and deleting documents is
/// handled outside this service.
mod presigner;

pub use presigner::{PresignerTrait, S3Location, S3Presigner, StorageError};
