//! Application services for card orchestration.

mod escalation;
mod notification;

pub use escalation::{
    CardService, CardServiceError, CardServiceResult, OpenCardRequest, TickReport,
};
pub use notification::NotificationTemplates;
