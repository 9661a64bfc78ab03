//! Landsat Collection 2 pixel-quality (`QA_PIXEL`) and radiometric
//! saturation (`QA_RADSAT`) checks.

use std::fmt;

/// `QA_PIXEL` flags that disqualify a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum QaFlag {
    Fill = 1 << 0,
    DilatedCloud = 1 << 1,
    Cirrus = 1 << 2,
    Cloud = 1 << 3,
    CloudShadow = 1 << 4,
}

impl QaFlag {
    pub const REJECTED: [QaFlag; 5] = [
        QaFlag::Fill,
        QaFlag::DilatedCloud,
        QaFlag::Cirrus,
        QaFlag::Cloud,
        QaFlag::CloudShadow,
    ];

    pub fn bit(self) -> u16 {
        self as u16
    }

    pub fn is_set(self, qa_pixel: u16) -> bool {
        qa_pixel & self.bit() != 0
    }

    /// Union of all rejected flags.
    pub fn rejection_mask() -> u16 {
        Self::REJECTED.iter().fold(0, |mask, flag| mask | flag.bit())
    }
}

impl fmt::Display for QaFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QaFlag::Fill => write!(f, "fill"),
            QaFlag::DilatedCloud => write!(f, "dilated cloud"),
            QaFlag::Cirrus => write!(f, "cirrus"),
            QaFlag::Cloud => write!(f, "cloud"),
            QaFlag::CloudShadow => write!(f, "cloud shadow"),
        }
    }
}

pub fn is_clear(qa_pixel: u16) -> bool {
    !QaFlag::REJECTED.iter().any(|flag| flag.is_set(qa_pixel))
}

/// Any set bit means at least one band saturated.
pub fn is_unsaturated(qa_radsat: u16) -> bool {
    qa_radsat == 0
}

pub fn is_valid(qa_pixel: u16, qa_radsat: u16) -> bool {
    is_clear(qa_pixel) && is_unsaturated(qa_radsat)
}
