pub mod level;
pub mod streak;
pub mod xp;
