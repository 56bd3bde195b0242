pub mod amount;
pub mod events;
pub mod feedback;
pub mod gift;
pub mod injector;
pub mod popup;
pub mod render;
pub mod share;
pub mod task;
