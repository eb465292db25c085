use super::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use time::macros::datetime;

#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<String>>,
    fail_put: bool,
    put_delay: Duration,
    stored: AtomicBool,
}

impl RecordingStore {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BlobStore for RecordingStore {
    async fn create_container_if_absent(&self, container: &str) -> Result<(), StorageError> {
        self.calls.lock().unwrap().push(format!("create {container}"));
        Ok(())
    }

    async fn put_blob(
        &self,
        container: &str,
        blob: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        tokio::time::sleep(self.put_delay).await;
        if self.fail_put {
            return Err(StorageError::Response { status: 403, body: "AuthorizationFailure".into() });
        }
        self.stored.store(true, Ordering::SeqCst);
        self.calls.lock().unwrap().push(format!(
            "put {container}/{blob} {} {}",
            data.len(),
            content_type.unwrap_or("-")
        ));
        Ok(())
    }

    fn signed_read_url(&self, container: &str, blob: &str, expiry: OffsetDateTime) -> Result<String, StorageError> {
        Ok(format!("https://acct.blob.test/{container}/{blob}?sp=r&se={}", expiry.unix_timestamp()))
    }
}

fn service(store: Arc<RecordingStore>) -> ScopedUploadService {
    ScopedUploadService::new(store, "resumes", Duration::from_secs(3600))
}

#[tokio::test]
async fn upload_creates_container_puts_and_signs() {
    let store = Arc::new(RecordingStore::default());
    let now = datetime!(2026-10-19 12:00:00 UTC);
    let blob = service(store.clone())
        .upload_at(Bytes::from_static(b"%PDF-1.7"), "resume.pdf", Some("application/pdf"), now)
        .await
        .unwrap();

    assert_eq!(blob.name, format!("{}-resume.pdf", now.unix_timestamp() * 1000));
    assert_eq!(blob.expires_at, datetime!(2026-10-19 13:00:00 UTC));
    assert!(blob.url.contains("sp=r"));
    assert!(blob.url.ends_with(&format!("se={}", blob.expires_at.unix_timestamp())));
    assert_eq!(
        store.calls(),
        vec!["create resumes".to_string(), format!("put resumes/{} 8 application/pdf", blob.name)]
    );
}

#[tokio::test]
async fn failed_put_returns_no_url() {
    let store = Arc::new(RecordingStore { fail_put: true, ..RecordingStore::default() });
    let err = service(store.clone())
        .upload(Bytes::from_static(b"x"), "cv.pdf", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Response { status: 403, .. }));
    assert_eq!(store.calls(), vec!["create resumes".to_string()]);
}

#[tokio::test]
async fn upload_keeps_running_when_caller_is_dropped() {
    let store = Arc::new(RecordingStore { put_delay: Duration::from_millis(100), ..RecordingStore::default() });
    let uploads = service(store.clone());

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), uploads.upload(Bytes::from_static(b"%PDF"), "cv.pdf", None)).await;
    assert!(abandoned.is_err());
    assert!(!store.stored.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(store.stored.load(Ordering::SeqCst));
    assert_eq!(store.calls().len(), 2);
}

fn upload_config(connection_string: Option<&str>) -> UploadConfig {
    UploadConfig {
        connection_string: connection_string.map(str::to_owned),
        container: "resumes".into(),
        sas_ttl: Duration::from_secs(3600),
        max_bytes: 1024,
    }
}

#[test]
fn from_config_without_connection_string_is_misconfigured() {
    let err = ScopedUploadService::from_config(&upload_config(None)).err().unwrap();
    assert!(matches!(&err, StorageError::Misconfigured(m) if m.contains("not configured")));
}

#[test]
fn from_config_keeps_connection_string_error() {
    let err = ScopedUploadService::from_config(&upload_config(Some("AccountName=acct"))).err().unwrap();
    assert!(matches!(&err, StorageError::Misconfigured(m) if m.contains("AccountKey")));
}

#[test]
fn from_config_accepts_development_storage() {
    assert!(ScopedUploadService::from_config(&upload_config(Some("UseDevelopmentStorage=true"))).is_ok());
}

#[test]
fn blob_name_uses_millis_and_strips_directories() {
    let now = datetime!(2026-10-19 12:00:00.123 UTC);
    let millis = now.unix_timestamp() * 1000 + 123;
    assert_eq!(blob_name(now, "cv.pdf"), format!("{millis}-cv.pdf"));
    assert_eq!(blob_name(now, r"C:\fakepath\cv.pdf"), format!("{millis}-cv.pdf"));
    assert_eq!(blob_name(now, "a/b/cv.pdf"), format!("{millis}-cv.pdf"));
}
