pub mod auth_service;
pub mod holiday_service;
pub mod prediction_service;
pub mod routing_service;
pub mod simulation_service;
pub mod user_store;

pub use auth_service::JwtService;
pub use holiday_service::{BrasilApiHolidays, HolidayCalendar};
pub use prediction_service::MlClient;
pub use routing_service::OrsClient;
pub use simulation_service::SimulationService;
pub use user_store::{InMemoryUserStore, MongoUserStore, UserStore};
