pub mod positions;
pub mod prices;

pub use positions::PositionService;
pub use prices::PriceService;
