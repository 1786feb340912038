use async_trait::async_trait;
use mockall::mock;
use sports_events::application::ports::{RefreshNotifier, RemoteEventSource};
use sports_events::domain::{BackgroundUpdate, Event};
use sports_events::shared::AppError;

mock! {
    pub RemoteSource {}

    #[async_trait]
    impl RemoteEventSource for RemoteSource {
        async fn fetch_events(&self) -> Result<Vec<Event>, AppError>;
    }
}

mock! {
    pub Notifier {}

    impl RefreshNotifier for Notifier {
        fn notify(&self, update: BackgroundUpdate) -> Result<(), AppError>;
    }
}

pub fn remote_returning(events: Vec<Event>) -> MockRemoteSource {
    let mut remote = MockRemoteSource::new();
    remote
        .expect_fetch_events()
        .times(1)
        .returning(move || Ok(events.clone()));
    remote
}

pub fn remote_never_called() -> MockRemoteSource {
    let mut remote = MockRemoteSource::new();
    remote.expect_fetch_events().never();
    remote
}
