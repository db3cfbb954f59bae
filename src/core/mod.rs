pub mod record;
pub mod time;
pub mod view;

pub use record::NavigationRecord;
pub use time::TimeSpan;
pub use view::ViewState;
