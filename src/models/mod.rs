// Models module - Database entity representations

pub mod car;
pub mod driver;
pub mod manufacturer;

pub use car::Car;
pub use driver::Driver;
pub use manufacturer::Manufacturer;
