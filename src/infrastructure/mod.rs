// Infrastructure layer module
// Adapters for the team profile store and the enhancement collaborator
// Follows Hexagonal Architecture

pub mod http_enhancer;
pub mod team_files;

pub use http_enhancer::HttpEnhancer;
pub use team_files::FileTeamProfileSource;
