use tokio::sync::broadcast::{self, Sender};

use crate::widget::events::ShareEvent;


const BUFFER_SIZE: usize = 50;
pub fn run() -> Sender<ShareEvent> {
    let (event_sender, _) = broadcast::channel(BUFFER_SIZE);
    event_sender
}
