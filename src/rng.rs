//! Random source construction. Everything random in the crate goes through a
//! `SmallRng` handed in by the owner so tests can pin the seed.

use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Fresh 64-bit seed from the browser's crypto source (or the OS natively).
/// Falls back to the performance clock when no entropy source is reachable.
pub fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            log::warn!("entropy source unavailable ({err}), seeding from clock");
            clock_seed()
        }
    }
}

fn clock_seed() -> u64 {
    let now = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    // Mix so nearby timestamps give unrelated streams.
    (now.to_bits()).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0xD1B5_4A32_D192_ED03
}

pub fn seeded(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

pub fn from_entropy() -> SmallRng {
    seeded(entropy_seed())
}
