pub mod aggregate;
pub mod comparison;
pub mod directory;
pub mod emission;
pub mod pivot;
pub mod record;
pub mod region;
pub mod scenario;
pub mod series;
pub mod year_month;
