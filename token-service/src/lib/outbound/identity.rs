pub mod directory;

pub use directory::StaticUserDirectory;
pub use directory::UserRecord;
