pub mod position_repo;

pub use position_repo::PositionRepository;
