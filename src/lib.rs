pub mod archive;
pub mod bundle;
pub mod directory;
pub mod writer;

pub use archive::{ArchiveError, Manifest, RawArchive, RecordInfo};
pub use bundle::{ArchiveKind, AssetBundle, FrameId};
pub use directory::{DirectoryError, RecordDirectory, RecordEntry};
pub use writer::{FlexWriter, WriteError};
