mod element;
mod options;
mod page_agent;
mod status;
mod widget;

pub use element::ElementInfo;
pub use options::{FormMessage, MessageKind, OptionsDraft, OptionsForm};
pub use page_agent::{
    EventTarget, NO_ACTIVE_FIELD_MESSAGE, NO_INPUT_TEXT_MESSAGE, PageAgent, PageSurface,
};
pub use status::{AssistantStatus, StatusSnapshot, StatusView};
pub use widget::{AssistantWidget, WidgetState, WidgetTransitionError};
