use async_trait::async_trait;
use cellview::{
    ConnectionError, EventDispatcher, LoadSignal, PanelEvent, Result, ScreenFetcher,
    ScreenshotHost,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// Serves `image` for every path except those containing "broken".
#[derive(Clone, Default)]
struct FakeScreens {
    requested: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ScreenFetcher for FakeScreens {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.requested.lock().unwrap().push(path.to_string());
        if path.contains("broken") {
            return Err(ConnectionError::HttpStatus {
                endpoint: path.to_string(),
                status: 404,
            }
            .into());
        }
        Ok(format!("png:{}", path).into_bytes())
    }
}

#[tokio::test]
async fn test_host_loads_and_saves_each_screenshot() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("screen.png");
    let screens = FakeScreens::default();
    let load = LoadSignal::new();
    let events = EventDispatcher::default();

    let host = ScreenshotHost::new(screens.clone(), load.clone()).save_to(&target);
    let task = tokio::spawn(host.run(events.subscribe()));

    events.publish(PanelEvent::clear_info());
    events.publish(PanelEvent::ScreenUpdated {
        url: "/api/screen/screen?date=1".into(),
    });
    events.publish(PanelEvent::ScreenUpdated {
        url: "/api/screen/screen?date=2".into(),
    });
    drop(events);

    assert_eq!(task.await.unwrap(), 2);
    assert!(load.is_set());
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "png:/api/screen/screen?date=2"
    );
    assert_eq!(screens.requested.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_download_is_not_marked_loaded() {
    let screens = FakeScreens::default();
    let load = LoadSignal::new();
    let events = EventDispatcher::default();

    let task = tokio::spawn(ScreenshotHost::new(screens, load.clone()).run(events.subscribe()));
    events.publish(PanelEvent::ScreenUpdated {
        url: "/api/screen/broken".into(),
    });
    events.publish(PanelEvent::Alert("Check your network connection!".into()));
    drop(events);

    assert_eq!(task.await.unwrap(), 0);
    assert!(!load.is_set());
}
