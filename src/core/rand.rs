//! Small deterministic pseudo-random generators.
//!
//! None of these are suitable for cryptographic use. Each generator is a
//! plain value type; the free functions (`rand16`, `srand16`, ...) drive a
//! process-wide instance guarded by a mutex, for callers that just want
//! "the" generator.

use parking_lot::Mutex;

const LCG_MULTIPLIER: u32 = 69069;
const LCG_INCREMENT: u32 = 262145;
const MWC_DEFAULT: u32 = 362436069;
const XORSHIFT_DEFAULT: u32 = 123456789;
const XOSHIRO_DEFAULT: [u32; 4] = [0xcafef00d, 0xf01dab1e, 0x5eed1e55, 0x1dea112e];

/// A source of 16-bit random values in `[0, 65535]`.
pub trait Random16 {
    fn next16(&mut self) -> u32;
}

/// Fast linear congruential generator (Marsaglia).
///
/// Trades statistical quality for speed compared to [`Rand16`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rand16Fast {
    seed: u32,
}

impl Rand16Fast {
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
    }
}

impl Default for Rand16Fast {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Random16 for Rand16Fast {
    fn next16(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
        self.seed >> 16
    }
}

/// Marsaglia's KISS: an LCG, a multiply-with-carry and a xorshift register
/// combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rand16 {
    x: u32,
    y: u32,
    z: u32,
}

impl Rand16 {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub fn seeds(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.z)
    }

    pub fn reseed(&mut self, x: u32, y: u32, z: u32) {
        *self = Self::new(x, y, z);
    }
}

impl Default for Rand16 {
    fn default() -> Self {
        Self::new(1, MWC_DEFAULT, XORSHIFT_DEFAULT)
    }
}

impl Random16 for Rand16 {
    fn next16(&mut self) -> u32 {
        self.x = self.x.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);

        if self.y == 0 {
            self.y = MWC_DEFAULT;
        }
        self.y = 36969u32.wrapping_mul(self.y & 0xffff).wrapping_add(self.y >> 16);

        if self.z == 0 {
            self.z = XORSHIFT_DEFAULT;
        }
        self.z ^= self.z << 17;
        self.z ^= self.z >> 13;
        self.z ^= self.z << 5;

        (self.x ^ (self.y << 16) ^ self.z) >> 16
    }
}

/// Xoshiro128** (Blackman, Vigna) with 128 bits of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rand32 {
    state: [u32; 4],
}

impl Rand32 {
    pub const fn new() -> Self {
        Self {
            state: XOSHIRO_DEFAULT,
        }
    }

    pub fn from_seed(x: u64) -> Self {
        let mut rng = Self::new();
        rng.seed(x);
        rng
    }

    /// Seeds the low 64 bits of state with one SplitMix64 step of `x`.
    /// The upper two state words are kept.
    pub fn seed(&mut self, x: u64) {
        let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^= z >> 31;
        self.state[0] = z as u32;
        self.state[1] = (z >> 32) as u32;
    }

    pub fn next32(&mut self) -> u32 {
        let s = &mut self.state;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 9;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(11);

        result
    }
}

impl Default for Rand32 {
    fn default() -> Self {
        Self::new()
    }
}

static FAST: Mutex<Rand16Fast> = Mutex::new(Rand16Fast::new(1));
static KISS: Mutex<Rand16> = Mutex::new(Rand16::new(1, MWC_DEFAULT, XORSHIFT_DEFAULT));
static XOSHIRO: Mutex<Rand32> = Mutex::new(Rand32::new());

pub fn srand16fast(x: u32) {
    FAST.lock().reseed(x);
}

pub fn get_rand16fast() -> u32 {
    FAST.lock().seed()
}

pub fn rand16fast() -> u32 {
    FAST.lock().next16()
}

pub fn srand16(x: u32, y: u32, z: u32) {
    KISS.lock().reseed(x, y, z);
}

pub fn get_rand16() -> (u32, u32, u32) {
    KISS.lock().seeds()
}

pub fn rand16() -> u32 {
    KISS.lock().next16()
}

pub fn srand32(x: u64) {
    XOSHIRO.lock().seed(x);
}

pub fn rand32() -> u32 {
    XOSHIRO.lock().next32()
}

/// Element types with a distinguished "empty" value, used by [`shuffle_nz`].
pub trait Zeroable {
    fn is_zero(&self) -> bool;
}

macro_rules! impl_zeroable_int {
    ($($t:ty),*) => {
        $(impl Zeroable for $t {
            fn is_zero(&self) -> bool {
                *self == 0
            }
        })*
    };
}

impl_zeroable_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl<const N: usize> Zeroable for [u8; N] {
    fn is_zero(&self) -> bool {
        crate::core::math::is_zero(self)
    }
}

/// Durstenfeld's Fisher-Yates shuffle.
///
/// The random index is taken modulo the remaining count, so lists longer
/// than 65536 elements are not shuffled uniformly.
pub fn shuffle<T, R: Random16 + ?Sized>(list: &mut [T], rng: &mut R) {
    if list.len() < 2 {
        return;
    }
    for count in (2..=list.len()).rev() {
        let j = rng.next16() as usize % count;
        list.swap(count - 1, j);
    }
}

/// Shuffles `list` up to, but not including, its trailing zero elements.
pub fn shuffle_nz<T: Zeroable, R: Random16 + ?Sized>(list: &mut [T], rng: &mut R) {
    let count = list.len() - list.iter().rev().take_while(|v| v.is_zero()).count();
    shuffle(&mut list[..count], rng);
}
