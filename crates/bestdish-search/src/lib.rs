pub mod debounce;
pub mod filter;

pub use debounce::{SearchClosed, SearchHandle, SearchState, DEFAULT_DEBOUNCE};
pub use filter::filter_businesses;
