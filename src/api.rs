mod client;
mod energy;
mod latest;
pub mod record;

pub use self::{energy::Api, latest::Latest};
