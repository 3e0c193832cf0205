pub mod infobip;
pub mod telerivet;
