pub mod card;
pub mod interval;
pub mod selector;

pub use card::{CardContent, Flashcard, RenderedCard, Response};
pub use interval::{FirstReviewRule, IntervalPolicy, Multipliers};
pub use selector::{DueCardSelector, SelectionPolicy};
