use anyhow::Result;

use crate::model::SeasonData;

/// Where teams, events and fixtures come from.
///
/// Implementations do their own I/O and decoding and hand back complete records. An `Err`
/// leaves the consumer's state untouched.
pub trait SeasonSource {
    fn fetch(&self) -> Result<SeasonData>;
}

impl<S: SeasonSource + ?Sized> SeasonSource for Box<S> {
    fn fetch(&self) -> Result<SeasonData> {
        (**self).fetch()
    }
}
