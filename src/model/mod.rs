//! Data model shared by the outline, section and ranking stages.

mod outline;
mod report;
mod section;

pub use outline::{Heading, HeadingLevel, Outline};
pub use report::{RankedSection, Report, ReportMetadata, SubSection};
pub use section::Section;
