pub mod news_service;

pub use crate::domain::model::{DataSource, NewsDraft, NewsRecord};
pub use crate::domain::ports::NewsSource;
pub use crate::utils::error::Result;
pub use news_service::{NewsService, ServiceStatus};
