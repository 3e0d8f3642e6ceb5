//! Numeric bounds shared across the sample pipeline.

/// Lower bound of the 8-bit signed sample domain stored in the message buffer.
pub const PCM8_MIN: i32 = -128;

/// Upper bound of the 8-bit signed sample domain stored in the message buffer.
pub const PCM8_MAX: i32 = 127;

/// Offset that recenters an 8-bit signed sample into an unsigned range.
pub const PCM8_OFFSET: f32 = 128.0;
