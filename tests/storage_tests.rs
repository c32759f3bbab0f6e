use edu_portal::storage::{MockStorageService, S3StorageClient, StorageService, sanitize_key};
use uuid::Uuid;

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let mock = MockStorageService::new();
        let filename = "lecture.mp4";
        let result = mock.get_presigned_upload_url(filename, "video/mp4").await;
        assert!(result.is_ok());

        let url = result.unwrap();

        assert!(url.contains("signature=fake"));
        assert!(url.contains(filename));
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockStorageService::new_failing();
        let result = mock
            .get_presigned_upload_url("lecture.mp4", "video/mp4")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_sanitization() {
        let mock = MockStorageService::new();
        let result = mock
            .get_presigned_upload_url("../../etc/passwd", "text/plain")
            .await;
        assert!(result.is_ok());

        let url = result.unwrap();

        // The sanitized key is embedded in the URL; traversal segments are gone.
        assert!(!url.contains(".."));
    }

    #[tokio::test]
    async fn test_mock_public_url_is_stable() {
        let mock = MockStorageService::new();
        let url = mock.public_url("uploads/u1/doc.pdf");
        assert_eq!(url, "http://localhost:9000/mock-bucket/uploads/u1/doc.pdf");
        // Sanitization applies on the public side too.
        assert!(!mock.public_url("../uploads/doc.pdf").contains(".."));
    }

    #[test]
    fn test_sanitize_key_strips_navigation_segments() {
        assert_eq!(sanitize_key("a/../b/./c"), "a/b/c");
        assert_eq!(sanitize_key("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_key("plain.pdf"), "plain.pdf");
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_client_creation() {
        let _client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;
        // Just testing that construction doesn't panic
    }

    #[tokio::test]
    async fn test_s3_presigned_url_format() {
        let client = S3StorageClient::new(
            "http://localhost:9000",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;

        let key = format!("uploads/kyc/aadhar-{}.pdf", Uuid::new_v4());
        let result = client
            .get_presigned_upload_url(&key, "application/pdf")
            .await;

        // We expect this to succeed and return a URL
        assert!(result.is_ok());

        let url = result.unwrap();

        assert!(url.contains("localhost:9000"));
        assert!(url.contains(&key));
    }

    #[tokio::test]
    async fn test_s3_public_url_is_path_style() {
        let client = S3StorageClient::new(
            "http://localhost:9000/",
            "us-east-1",
            "testkey",
            "testsecret",
            "testbucket",
        )
        .await;

        // Trailing slash on the endpoint must not double up.
        assert_eq!(
            client.public_url("uploads/u1/doc.pdf"),
            "http://localhost:9000/testbucket/uploads/u1/doc.pdf"
        );
    }
}
