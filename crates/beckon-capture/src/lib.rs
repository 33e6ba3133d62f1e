mod directory;
mod solid;

pub use directory::DirectoryCamera;
pub use solid::SolidCamera;
