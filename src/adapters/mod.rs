// Adapters layer: concrete implementations of the domain ports (credentials, clock).

pub mod clock;
pub mod credentials;

pub use clock::{FixedClock, SystemClock};
pub use credentials::{EnvCredentialsProvider, StaticCredentialsProvider};
