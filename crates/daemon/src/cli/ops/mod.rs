pub mod daemon;
pub mod download;
pub mod health;
pub mod init;
pub mod ls;
pub mod token;
pub mod version;

pub use daemon::Daemon;
pub use download::Download;
pub use health::Health;
pub use init::Init;
pub use ls::Ls;
pub use token::Token;
pub use version::Version;
