pub mod relay;

pub use relay::{ChartPayload, RelayProvider};
