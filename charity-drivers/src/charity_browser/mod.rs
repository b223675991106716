pub mod driver;
pub mod idle;
pub mod launch;
pub mod locate;
pub mod page;
pub mod probe;
