use super::*;
use time::macros::datetime;

const KEY: &str = "c2VjcmV0LWtleQ==";

fn account() -> StorageAccount {
    StorageAccount::from_connection_string(&format!(
        "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey={KEY};EndpointSuffix=core.windows.net"
    ))
    .unwrap()
}

// ===== connection string =====

#[test]
fn parses_standard_connection_string() {
    let account = account();
    assert_eq!(account.credential.account, "acct");
    assert_eq!(account.blob_endpoint.as_str(), "https://acct.blob.core.windows.net/");
}

#[test]
fn explicit_blob_endpoint_wins() {
    let account = StorageAccount::from_connection_string(&format!(
        "AccountName=acct;AccountKey={KEY};BlobEndpoint=http://localhost:10000/acct/;"
    ))
    .unwrap();
    assert_eq!(account.blob_endpoint.as_str(), "http://localhost:10000/acct");
}

#[test]
fn development_storage_shortcut() {
    let account = StorageAccount::from_connection_string("UseDevelopmentStorage=true").unwrap();
    assert_eq!(account.credential.account, "devstoreaccount1");
    assert_eq!(account.blob_endpoint.host_str(), Some("127.0.0.1"));
}

#[test]
fn missing_key_is_misconfigured() {
    let err = StorageAccount::from_connection_string("AccountName=acct").unwrap_err();
    assert!(err.to_string().contains("AccountKey"));
}

#[test]
fn missing_name_is_misconfigured() {
    let err = StorageAccount::from_connection_string(&format!("AccountKey={KEY}")).unwrap_err();
    assert!(err.to_string().contains("AccountName"));
}

#[test]
fn resource_url_encodes_blob_name() {
    let url = account()
        .resource_url("resumes", Some("1760875200000-my cv#1.pdf"))
        .unwrap();
    assert_eq!(url.path(), "/resumes/1760875200000-my%20cv%231.pdf");
}

// ===== shared key =====

#[test]
fn http_date_is_rfc1123() {
    assert_eq!(http_date(datetime!(2026-10-19 12:00:00 UTC)), "Mon, 19 Oct 2026 12:00:00 GMT");
}

#[test]
fn create_container_string_to_sign() {
    let mut url = account().resource_url("resumes", None).unwrap();
    url.query_pairs_mut().append_pair("restype", "container");
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(0usize));
    headers.insert("x-ms-version", HeaderValue::from_static(SERVICE_VERSION));
    headers.insert("x-ms-date", HeaderValue::from_static("Mon, 19 Oct 2026 12:00:00 GMT"));

    let expected = format!(
        "PUT{}x-ms-date:Mon, 19 Oct 2026 12:00:00 GMT\nx-ms-version:2021-08-06\n/acct/resumes\nrestype:container",
        "\n".repeat(12)
    );
    assert_eq!(shared_key_string_to_sign(&Method::PUT, &url, &headers, "acct"), expected);
}

#[test]
fn put_blob_string_to_sign_includes_length_and_type() {
    let url = account().resource_url("resumes", Some("cv.pdf")).unwrap();
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(42usize));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));

    let signed = shared_key_string_to_sign(&Method::PUT, &url, &headers, "acct");
    assert!(signed.starts_with("PUT\n\n\n42\n\napplication/pdf\n"));
    assert!(signed.ends_with("x-ms-blob-type:BlockBlob\n/acct/resumes/cv.pdf"));
}

// ===== SAS url =====

#[test]
fn signed_read_url_points_at_blob() {
    let store = AzureBlobStore::new(account()).unwrap();
    let url = store
        .signed_read_url("resumes", "cv.pdf", datetime!(2026-10-19 13:00:00 UTC))
        .unwrap();
    let parsed = Url::parse(&url).unwrap();
    assert_eq!(parsed.host_str(), Some("acct.blob.core.windows.net"));
    assert_eq!(parsed.path(), "/resumes/cv.pdf");
    let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
    assert_eq!(pairs["sp"], "r");
    assert_eq!(pairs["sr"], "b");
    assert_eq!(pairs["se"], "2026-10-19T13:00:00Z");
    assert!(!pairs["sig"].is_empty());
}
