use std::fmt::{Debug, Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum BchError {
    // Construction
    InvalidOrder,
    InvalidCorrection,
    ReduciblePoly,
    NoTraceBase,

    // Encode/decode arguments
    DataTooLong,
    EccSizeMismatch,
    SyndromesSizeMismatch,
    InvalidErrloc,

    // Decode outcome
    Uncorrectable,
}

impl Display for BchError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            Self::InvalidOrder => "Field order must be between 5 and 15",
            Self::InvalidCorrection => "Correction capability out of range for field order",
            Self::ReduciblePoly => "Primitive polynomial is reducible or has wrong degree",
            Self::NoTraceBase => "Cannot build quadratic trace base",
            Self::DataTooLong => "Data exceeds code capacity",
            Self::EccSizeMismatch => "Ecc buffer length doesn't match ecc size",
            Self::SyndromesSizeMismatch => "Syndrome slice length doesn't match 2t",
            Self::InvalidErrloc => "Error location outside codeword",
            Self::Uncorrectable => "Too many errors",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for BchError {}

pub type BchResult<T> = Result<T, BchError>;
