use num::{traits::AsPrimitive, Num, NumCast};
use std::fmt::Debug;

/// Pixel value types a [RasterGrid](crate::RasterGrid) can hold.
pub trait DataType:
    Num + NumCast + AsPrimitive<f64> + PartialOrd + Copy + Send + Sync + Debug + 'static
{
    /// Nodata used by a merge when neither grid declares one.
    const FALLBACK_NODATA: Self;

    /// Equality that also treats `NaN` as matching a `NaN` nodata.
    #[allow(clippy::eq_op)]
    fn is_nodata(self, nodata: Self) -> bool {
        self == nodata || (self != self && nodata != nodata)
    }
}

macro_rules! float_data_type {
    ($($t:ty),*) => {
        $(impl DataType for $t {
            const FALLBACK_NODATA: Self = <$t>::NAN;
        })*
    };
}

macro_rules! int_data_type {
    ($($t:ty),*) => {
        $(impl DataType for $t {
            const FALLBACK_NODATA: Self = <$t>::MIN;
        })*
    };
}

float_data_type!(f32, f64);
int_data_type!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Casts `value` or falls back to `default` if it does not fit in `TO`.
pub fn cast_or<TO: DataType>(value: f64, default: TO) -> TO {
    <TO as NumCast>::from(value).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(f32::NAN, f32::NAN, true)]
    #[case(1.0, f32::NAN, false)]
    #[case(f32::NAN, 0.0, false)]
    #[case(-1.0, -1.0, true)]
    fn nodata_comparison_handles_nan(#[case] value: f32, #[case] nodata: f32, #[case] expected: bool) {
        assert_eq!(value.is_nodata(nodata), expected)
    }

    #[rstest]
    fn integer_fallback_is_min() {
        assert_eq!(u16::FALLBACK_NODATA, 0);
        assert_eq!(i16::FALLBACK_NODATA, i16::MIN);
        assert!(f64::FALLBACK_NODATA.is_nan());
    }

    #[rstest]
    fn cast_falls_back_when_out_of_range() {
        assert_eq!(cast_or::<u8>(300.0, 7), 7);
        assert_eq!(cast_or::<u8>(200.4, 7), 200);
        assert_eq!(cast_or::<i16>(f64::NAN, -1), -1);
    }
}
