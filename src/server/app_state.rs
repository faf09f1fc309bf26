use crate::{
    api::Api,
    config::Config,
    mailer::EmailTransport,
    server::status::{Status, StatusLevel},
};
use std::sync::{Arc, RwLock};

pub struct AppState<ET: EmailTransport> {
    pub config: Config,
    pub status: RwLock<Status>,
    pub api: Arc<Api<ET>>,
}

impl<ET: EmailTransport> AppState<ET> {
    pub fn new(config: Config, api: Arc<Api<ET>>) -> Self {
        let version = config.version.to_string();
        Self {
            config,
            status: RwLock::new(Status {
                version,
                level: StatusLevel::Available,
            }),
            api,
        }
    }
}
