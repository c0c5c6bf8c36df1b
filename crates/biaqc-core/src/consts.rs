/// Bit depth assumed when the caller does not pass one to the intensity extractor.
pub const DEFAULT_BIT_DEPTH: u32 = 12;

/// Gray levels used for the co-occurrence matrix (8-bit rescale).
pub const GLCM_LEVELS: usize = 256;

/// Default GLCM pixel distances.
pub const DEFAULT_GLCM_DISTANCES: [usize; 4] = [1, 2, 4, 8];

/// Default GLCM angles in radians: 0, π/4, π/2, 3π/4.
pub const DEFAULT_GLCM_ANGLES: [f64; 4] = [
    0.0,
    std::f64::consts::FRAC_PI_4,
    std::f64::consts::FRAC_PI_2,
    3.0 * std::f64::consts::FRAC_PI_4,
];

/// Default LBP sampling radius.
pub const DEFAULT_LBP_RADIUS: f64 = 1.0;

/// Default LBP sample-point count.
pub const DEFAULT_LBP_POINTS: usize = 8;

/// Components kept per reduced feature group.
pub const DEFAULT_PCA_COMPONENTS: usize = 2;

/// Gaussian MAD consistency constant, `Φ⁻¹(0.75)`.
pub const MAD_TO_SIGMA: f64 = 0.674_489_750_196_081_7;

/// Daubechies-2 analysis high-pass filter.
pub const DB2_DEC_HI: [f64; 4] = [
    -0.482_962_913_144_534_16,
    0.836_516_303_737_807_9,
    -0.224_143_868_042_013_4,
    -0.129_409_522_551_260_37,
];

/// Time units in increasing order.
pub const TIME_UNITS: [&str; 7] = ["millisecond", "second", "minute", "hour", "day", "month", "year"];

/// `TIME_UNIT_DIVISORS[i]` converts `TIME_UNITS[i]` into `TIME_UNITS[i + 1]`.
pub const TIME_UNIT_DIVISORS: [f64; 6] = [1000.0, 60.0, 60.0, 24.0, 30.0, 12.0];

/// Zero-based row whose inter-frame delta is used as the unit-inference reference.
pub const TIME_REFERENCE_ROW: usize = 3;

/// File extensions picked up by the batch folder walk by default.
pub const DEFAULT_BATCH_EXTENSIONS: [&str; 4] = ["ser", "tif", "tiff", "png"];
