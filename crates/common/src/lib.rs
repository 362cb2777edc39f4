/**
 * Streaming zip archives of files and
 *  directory trees.
 * Classifies requested paths, walks directories
 *  and pushes entries into a zip stream as they
 *  are read.
 */
pub mod archive;
/**
 * Directory listings as returned to clients.
 */
pub mod entry;
/**
 * Signed bearer tokens guarding the API.
 */
pub mod token;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::archive::{
        build_archive, AllowAll, ArchiveError, ArchiveOptions, ArchiveReport, ArchiveRequest,
        HiddenPolicy, PathPolicy, RequestError, RootConfined,
    };
    pub use crate::entry::{list_children, Entry, ListError};
    pub use crate::token::{Claims, TokenError, TokenSigner};
    pub use crate::version::build_info;
}
