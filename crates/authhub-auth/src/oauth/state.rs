//! Anti-CSRF state values for the authorization redirect.

use rand::distr::Alphanumeric;
use rand::{Rng, rng};

/// Length of a generated state value.
pub const STATE_LENGTH: usize = 32;

/// Generate an opaque state value from the thread-local CSPRNG.
pub fn generate_state() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}
