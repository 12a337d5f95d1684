pub mod change;
pub use self::change::change;

pub mod form;
pub use self::form::{form, redirect_home};

pub mod health;
pub use self::health::health;
