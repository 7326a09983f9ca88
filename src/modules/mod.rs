pub mod periods;
pub mod school_years;

pub use self::periods::model::Period;
pub use self::school_years::model::SchoolYear;
