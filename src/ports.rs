use anyhow::{bail, Result};
use rand::seq::SliceRandom;

/// Lowest and highest valid TCP port numbers.
pub const MIN_PORT: u16 = 1;
pub const MAX_PORT: u16 = 65535;

/// Build the inclusive list of ports `start..=stop`.
///
/// With `randomize` set the same ports are returned in a uniformly random order;
/// every port still appears exactly once. An inverted range yields an empty list,
/// callers are expected to validate bounds first.
pub fn port_range(start: u16, stop: u16, randomize: bool) -> Vec<u16> {
    let mut ports: Vec<u16> = (start..=stop).collect();
    if randomize {
        ports.shuffle(&mut rand::rng());
    }
    ports
}

/// Convert a raw flag value into a TCP port (1..=65535).
pub fn port_from_u32(val: u32) -> Result<u16> {
    if val == 0 || val > u32::from(MAX_PORT) {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
