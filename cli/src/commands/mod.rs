pub mod chart;
pub mod inspect;
pub mod replay;
