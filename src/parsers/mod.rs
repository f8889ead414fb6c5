pub mod gocover;

use crate::error::Result;
use crate::model::Profile;

/// Every profile parser implements this trait.
pub trait Parser {
    /// Parse the input bytes into one `Profile` per source file.
    fn parse(&self, input: &[u8]) -> Result<Vec<Profile>>;
}
