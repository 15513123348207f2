use std::{fmt, str::FromStr};

/// Target collage shape, `WIDTH:HEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    width: u32,
    height: u32,
}

pub fn new(width: u32, height: u32) -> AspectRatio {
    AspectRatio { width, height }
}

impl AspectRatio {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = match s.split_once(':') {
            Some((w, h)) if !h.contains(':') => (w, h),
            _ => {
                return Err(String::from(
                    "aspect ratio must be in the format WIDTH:HEIGHT (e.g., 16:9)",
                ))
            }
        };

        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| String::from("aspect ratio values must be integers"))
        };
        let (width, height) = (parse(width)?, parse(height)?);

        if width == 0 || height == 0 {
            return Err(String::from("aspect ratio values must be positive"));
        }

        Ok(new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_width_and_height() {
        let ar: AspectRatio = "16:9".parse().unwrap();
        assert_eq!((ar.width(), ar.height()), (16, 9));
        assert_eq!(ar.to_string(), "16:9");
    }

    #[test]
    fn rejects_missing_separator() {
        assert!("169".parse::<AspectRatio>().is_err());
        assert!("16:9:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn rejects_non_integer_components() {
        let err = "16:nine".parse::<AspectRatio>().unwrap_err();
        assert!(err.contains("integers"));
        assert!("1.5:1".parse::<AspectRatio>().is_err());
        assert!("-1:1".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn rejects_zero_components() {
        assert!("0:1".parse::<AspectRatio>().is_err());
        assert!("1:0".parse::<AspectRatio>().is_err());
    }
}
